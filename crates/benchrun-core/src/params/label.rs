use std::collections::HashSet;

/// Derives the human-readable label for one iteration.
///
/// A token contributes to the label unless it is shared across both
/// commonality scopes: common to every iteration of the current parameter
/// set (`set_common`) and common to every parameter set of the run
/// (`run_common`). Surviving tokens keep their original order, lose one
/// leading `--`, and have `=`, `/`, and whitespace folded to `_`. When
/// nothing survives, the benchmark name stands in.
///
/// The result is deterministic and safe to use as a directory name.
pub fn label_for(
    tokens: &[String],
    set_common: &HashSet<String>,
    run_common: &HashSet<String>,
    benchmark: &str,
) -> String {
    let parts: Vec<String> = tokens
        .iter()
        .filter(|tok| !(set_common.contains(*tok) && run_common.contains(*tok)))
        .map(|tok| sanitize(tok))
        .collect();

    let label = parts.join("_");
    let label = label.trim_matches('_');
    if label.is_empty() {
        benchmark.to_string()
    } else {
        label.to_string()
    }
}

fn sanitize(token: &str) -> String {
    let stripped = token.strip_prefix("--").unwrap_or(token);
    stripped
        .chars()
        .map(|c| {
            if c == '=' || c == '/' || c.is_whitespace() {
                '_'
            } else {
                c
            }
        })
        .collect()
}
