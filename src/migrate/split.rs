//! Vote list splitting.
//!
//! Legacy posts carry their voters as comma-joined username strings, one
//! column per direction. Empty tokens (trailing or doubled commas, stray
//! whitespace) are expected in the legacy data and dropped silently.

use crate::model::VoteDirection;

/// Split one comma-joined list into trimmed, non-empty name tokens.
fn names(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|token| !token.is_empty())
}

/// Lazily yield one `(name, direction)` pair per voter: every name in
/// `upvotes` with [`VoteDirection::Up`], then every name in `downvotes`
/// with [`VoteDirection::Down`]. Pure function of its two inputs;
/// call again to restart.
pub fn vote_pairs<'a>(
    upvotes: &'a str,
    downvotes: &'a str,
) -> impl Iterator<Item = (&'a str, VoteDirection)> {
    names(upvotes)
        .map(|name| (name, VoteDirection::Up))
        .chain(names(downvotes).map(|name| (name, VoteDirection::Down)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collect(upvotes: &str, downvotes: &str) -> Vec<(String, VoteDirection)> {
        vote_pairs(upvotes, downvotes)
            .map(|(name, dir)| (name.to_string(), dir))
            .collect()
    }

    #[test]
    fn splits_both_directions() {
        let pairs = collect("alice,bob", "carol");
        assert_eq!(
            pairs,
            vec![
                ("alice".into(), VoteDirection::Up),
                ("bob".into(), VoteDirection::Up),
                ("carol".into(), VoteDirection::Down),
            ]
        );
    }

    #[test]
    fn empty_lists_yield_nothing() {
        assert!(collect("", "").is_empty());
        assert!(collect("   ", " , ,").is_empty());
    }

    #[test]
    fn double_comma_drops_the_empty_token() {
        let pairs = collect("carol,,dave", "");
        assert_eq!(
            pairs,
            vec![
                ("carol".into(), VoteDirection::Up),
                ("dave".into(), VoteDirection::Up),
            ]
        );
    }

    #[test]
    fn tokens_are_trimmed() {
        let pairs = collect(" alice , bob ", "carol ,");
        assert_eq!(
            pairs,
            vec![
                ("alice".into(), VoteDirection::Up),
                ("bob".into(), VoteDirection::Up),
                ("carol".into(), VoteDirection::Down),
            ]
        );
    }

    #[test]
    fn restartable_and_single_pass() {
        let up = "a,b";
        let down = "c";
        let first: Vec<_> = vote_pairs(up, down).collect();
        let second: Vec<_> = vote_pairs(up, down).collect();
        assert_eq!(first, second);
    }

    proptest! {
        /// Joining clean names with commas and splitting again is lossless.
        #[test]
        fn join_then_split_round_trips(names in prop::collection::vec("[a-z][a-z0-9_]{0,9}", 0..8)) {
            let joined = names.join(",");
            let split: Vec<String> = vote_pairs(&joined, "")
                .map(|(name, _)| name.to_string())
                .collect();
            prop_assert_eq!(split, names);
        }

        /// No input ever yields an empty or unpadded-whitespace token.
        #[test]
        fn never_yields_blank_tokens(up in "[a-z, \t]{0,40}", down in "[a-z, \t]{0,40}") {
            for (name, _) in vote_pairs(&up, &down) {
                prop_assert!(!name.trim().is_empty());
                prop_assert_eq!(name, name.trim());
            }
        }
    }
}
