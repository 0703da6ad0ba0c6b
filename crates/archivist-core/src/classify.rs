//! Tag-based classification of catalog items.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Delimiter used by the catalog for multi-value columns (tags, categories).
pub const LIST_DELIMITER: &str = "; ";

/// Which of the two archive buckets an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Standard,
    Restricted,
}

/// Split a delimiter-joined list (`"Action; Puzzle"`) into tokens.
///
/// The separator is exactly `"; "`: a bare `;` is part of the token and no
/// other whitespace is trimmed, so `"a;Extreme"` is the single tag
/// `a;Extreme`. Empty tokens are dropped, so an empty column yields no tags.
pub fn split_tags(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(LIST_DELIMITER).filter(|t| !t.is_empty())
}

/// Configured set of tags that mark content as restricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestrictedTags {
    tags: HashSet<String>,
}

impl RestrictedTags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// True iff any tag is a member of the restricted set.
    pub fn is_restricted<I, S>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter().any(|t| self.contains(t.as_ref()))
    }

    /// Classify a raw tag column.
    pub fn classify(&self, joined_tags: &str) -> Classification {
        if self.is_restricted(split_tags(joined_tags)) {
            Classification::Restricted
        } else {
            Classification::Standard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn split_tags_uses_the_exact_separator() {
        let tags: Vec<_> = split_tags("Action; Puzzle; ; Adult; ").collect();
        assert_eq!(tags, vec!["Action", "Puzzle", "Adult"]);
        assert_eq!(split_tags("").count(), 0);
        assert_eq!(split_tags("a;Extreme").collect::<Vec<_>>(), vec!["a;Extreme"]);
        assert_eq!(split_tags("Puzzle ; x").collect::<Vec<_>>(), vec!["Puzzle ", "x"]);
    }

    #[test]
    fn bare_semicolon_does_not_split_a_restricted_tag_out() {
        let restricted = RestrictedTags::new(["Extreme"]);
        assert_eq!(restricted.classify("a;Extreme"), Classification::Standard);
        assert_eq!(restricted.classify("a; Extreme"), Classification::Restricted);
    }

    #[test]
    fn classify_matches_whole_tags_only() {
        let restricted = RestrictedTags::new(["Extreme"]);
        assert_eq!(restricted.classify("Action; Extreme"), Classification::Restricted);
        assert_eq!(restricted.classify("Extremely Fun"), Classification::Standard);
        assert_eq!(restricted.classify("extreme"), Classification::Standard);
        assert_eq!(restricted.classify(""), Classification::Standard);
    }

    #[test]
    fn empty_restricted_set_never_restricts() {
        let restricted = RestrictedTags::default();
        assert!(restricted.is_empty());
        assert!(!restricted.is_restricted(["Extreme", "Adult"]));
    }

    proptest! {
        #[test]
        fn restricted_iff_intersection_nonempty(
            tags in proptest::collection::vec("[a-e]{1,2}", 0..6),
            set in proptest::collection::hash_set("[a-e]{1,2}", 0..6),
        ) {
            let restricted = RestrictedTags::new(set.iter().cloned());
            let expected = tags.iter().any(|t| set.contains(t));
            prop_assert_eq!(restricted.is_restricted(&tags), expected);
            prop_assert_eq!(
                restricted.classify(&tags.join("; ")) == Classification::Restricted,
                expected
            );
        }

        #[test]
        fn empty_tags_are_never_restricted(set in proptest::collection::hash_set("[a-z]{1,4}", 0..8)) {
            let restricted = RestrictedTags::new(set);
            prop_assert!(!restricted.is_restricted(Vec::<String>::new()));
        }
    }
}
