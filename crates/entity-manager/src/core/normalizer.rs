//! Lookup key normalization.

use std::fmt::Debug;

/// Maps raw names and codes to the canonical form used for lookups.
///
/// Implementations must be idempotent: normalizing an already normalized
/// value returns it unchanged.
pub trait LookupNormalizer: Debug + Send + Sync {
    /// Normalizes an entity name.
    fn normalize_name(&self, name: &str) -> String;

    /// Normalizes an entity code.
    fn normalize_code(&self, code: &str) -> String;
}

/// Case-folding normalizer: trims surrounding whitespace and lowercases.
///
/// ```
/// use helios_entity_manager::core::{CaseFoldNormalizer, LookupNormalizer};
///
/// let normalizer = CaseFoldNormalizer;
/// assert_eq!(normalizer.normalize_name("  Blue Widget "), "blue widget");
/// assert_eq!(normalizer.normalize_code("ORD-7"), "ord-7");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseFoldNormalizer;

impl CaseFoldNormalizer {
    fn fold(value: &str) -> String {
        value.to_lowercase().trim().to_string()
    }
}

impl LookupNormalizer for CaseFoldNormalizer {
    fn normalize_name(&self, name: &str) -> String {
        Self::fold(name)
    }

    fn normalize_code(&self, code: &str) -> String {
        Self::fold(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_case_fold() {
        let n = CaseFoldNormalizer;
        assert_eq!(n.normalize_name("Widget"), "widget");
        assert_eq!(n.normalize_name("\tWIDGET\n"), "widget");
        assert_eq!(n.normalize_code(""), "");
    }

    #[test]
    fn test_case_fold_unicode() {
        let n = CaseFoldNormalizer;
        assert_eq!(n.normalize_name("ÜBER Straße"), "über straße");
        let once = n.normalize_name("İSTANBUL");
        assert_eq!(n.normalize_name(&once), once);
    }

    proptest! {
        #[test]
        fn normalize_name_is_idempotent(raw in "[ a-zA-Z0-9_.\\-ÀÉÎÕÜàéîõü]{0,40}") {
            let n = CaseFoldNormalizer;
            let once = n.normalize_name(&raw);
            prop_assert_eq!(n.normalize_name(&once), once);
        }

        #[test]
        fn normalize_code_is_idempotent(raw in "[ a-zA-Z0-9_.\\-]{0,40}") {
            let n = CaseFoldNormalizer;
            let once = n.normalize_code(&raw);
            prop_assert_eq!(n.normalize_code(&once), once);
        }
    }
}
