/// Splits one iteration parameter string into its whitespace-delimited
/// tokens. Order and duplicates are preserved; tokens are opaque here, no
/// `key=value` validation happens.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}
