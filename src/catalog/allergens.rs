//! Allergen Sets
//!
//! A sorted, de-duplicated set of allergen tags attached to meals and add-ons.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer};
use smallvec::SmallVec;

/// Allergen tags stored sorted so set operations are linear merges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllergenSet {
    tags: SmallVec<[String; 4]>,
}

impl AllergenSet {
    /// Create an allergen set, sorting and de-duplicating the tags.
    #[must_use]
    pub fn new(tags: SmallVec<[String; 4]>) -> Self {
        let mut set = Self { tags };

        set.tags.iter_mut().for_each(|tag| *tag = tag.to_lowercase());
        set.tags.sort();
        set.tags.dedup();

        set
    }

    /// Create an allergen set from string slices.
    pub fn from_strs(tags: &[&str]) -> Self {
        Self::new(tags.iter().map(ToString::to_string).collect())
    }

    /// Check whether the set contains an allergen (case-insensitive).
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.binary_search(&tag.to_lowercase()).is_ok()
    }

    /// Check whether the two sets share any allergen.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Allergens present in both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = SmallVec::new();
        let mut left = self.tags.iter();
        let mut right = other.tags.iter();
        let mut left_tag = left.next();
        let mut right_tag = right.next();

        while let (Some(left_ref), Some(right_ref)) = (left_tag, right_tag) {
            match left_ref.cmp(right_ref) {
                Ordering::Equal => {
                    result.push(left_ref.clone());
                    left_tag = left.next();
                    right_tag = right.next();
                }
                Ordering::Less => left_tag = left.next(),
                Ordering::Greater => right_tag = right.next(),
            }
        }

        Self { tags: result }
    }

    /// Iterate over the allergens in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Number of allergens.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if there are no allergens.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<'de> Deserialize<'de> for AllergenSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tags = Vec::<String>::deserialize(deserializer)?;

        Ok(Self::new(tags.into_iter().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sorts_and_dedups_case_insensitively() {
        let set = AllergenSet::from_strs(&["Nuts", "dairy", "nuts"]);

        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["dairy", "nuts"]);
    }

    #[test]
    fn contains_ignores_case() {
        let set = AllergenSet::from_strs(&["sesame"]);

        assert!(set.contains("Sesame"));
        assert!(!set.contains("gluten"));
    }

    #[test]
    fn intersection_returns_shared_allergens() {
        let item = AllergenSet::from_strs(&["dairy", "gluten", "nuts"]);
        let user = AllergenSet::from_strs(&["nuts", "shellfish"]);

        assert!(item.intersects(&user));
        assert_eq!(
            item.intersection(&user).iter().collect::<Vec<_>>(),
            vec!["nuts"]
        );
    }

    #[test]
    fn disjoint_sets_do_not_intersect() {
        let item = AllergenSet::from_strs(&["dairy"]);
        let user = AllergenSet::from_strs(&["nuts"]);

        assert!(!item.intersects(&user));
        assert!(AllergenSet::default().intersection(&user).is_empty());
    }
}
