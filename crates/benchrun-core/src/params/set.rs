use crate::errors::RunError;

/// Token separating parameter sets on the command line.
pub const SET_SEPARATOR: &str = "--";

/// One `--`-delimited block of user-supplied benchmark parameters. The
/// parameters are forwarded verbatim to the expansion tool; a `--samples=N`
/// inside the block is consumed here as the per-set sample-count override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSet {
    pub params: Vec<String>,
    pub samples: Option<usize>,
}

/// Splits the trailing CLI parameter vector into parameter sets.
///
/// An empty vector yields one empty set (a defaults-only run). Empty blocks
/// between separators are kept: the expansion tool decides what an empty
/// parameter set means.
pub fn split_parameter_sets(args: &[String]) -> Result<Vec<ParameterSet>, RunError> {
    let mut sets = Vec::new();
    let mut params: Vec<String> = Vec::new();
    let mut samples: Option<usize> = None;

    for arg in args {
        if arg == SET_SEPARATOR {
            sets.push(ParameterSet {
                params: std::mem::take(&mut params),
                samples: samples.take(),
            });
            continue;
        }
        if let Some(value) = arg.strip_prefix("--samples=") {
            let n: usize = value
                .parse()
                .map_err(|_| RunError::Config(format!("invalid --samples value `{value}`")))?;
            if n == 0 {
                return Err(RunError::Config("--samples must be at least 1".into()));
            }
            samples = Some(n);
            continue;
        }
        params.push(arg.clone());
    }
    sets.push(ParameterSet { params, samples });
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_block_is_one_set() {
        let sets = split_parameter_sets(&args(&["--bs=4k", "--rw=read"])).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].params, args(&["--bs=4k", "--rw=read"]));
        assert_eq!(sets[0].samples, None);
    }

    #[test]
    fn separator_splits_sets() {
        let sets = split_parameter_sets(&args(&["--bs=4k", "--", "--bs=1m", "--rw=write"])).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].params, args(&["--bs=4k"]));
        assert_eq!(sets[1].params, args(&["--bs=1m", "--rw=write"]));
    }

    #[test]
    fn samples_override_is_consumed_per_set() {
        let sets =
            split_parameter_sets(&args(&["--bs=4k", "--samples=3", "--", "--bs=1m"])).unwrap();
        assert_eq!(sets[0].samples, Some(3));
        assert_eq!(sets[0].params, args(&["--bs=4k"]));
        assert_eq!(sets[1].samples, None);
    }

    #[test]
    fn empty_input_is_one_defaults_only_set() {
        let sets = split_parameter_sets(&[]).unwrap();
        assert_eq!(sets.len(), 1);
        assert!(sets[0].params.is_empty());
    }

    #[test]
    fn trailing_separator_keeps_the_empty_set() {
        let sets = split_parameter_sets(&args(&["--bs=4k", "--"])).unwrap();
        assert_eq!(sets.len(), 2);
        assert!(sets[1].params.is_empty());
    }

    #[test]
    fn bad_samples_values_are_rejected() {
        assert!(split_parameter_sets(&args(&["--samples=zero"])).is_err());
        assert!(split_parameter_sets(&args(&["--samples=0"])).is_err());
    }
}
