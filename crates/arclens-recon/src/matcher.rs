//! Name-to-authority resolution against a vocabulary snapshot.

use arclens_core::AuthorityRecord;

/// Resolve a free-text name to the authority record it matches, if any.
///
/// Matching is case-insensitive exact-name lookup (not fuzzy, not
/// substring) after trimming whitespace. The vocabulary is scanned in
/// insertion order and the first match wins.
///
/// Matching is name-only and ignores the entry's type: a person and an
/// organization sharing a name will collide, and the earlier entry wins.
pub fn resolve_entry<'a>(name: &str, vocabulary: &'a [AuthorityRecord]) -> Option<&'a AuthorityRecord> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    vocabulary.iter().find(|a| a.name.to_lowercase() == needle)
}

/// Resolve a free-text name to an authority identity, if any.
pub fn resolve(name: &str, vocabulary: &[AuthorityRecord]) -> Option<u32> {
    resolve_entry(name, vocabulary).map(|a| a.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arclens_core::EntityType;

    fn vocab() -> Vec<AuthorityRecord> {
        vec![
            AuthorityRecord::new(1, "Golda Meir", EntityType::Person),
            AuthorityRecord::new(2, "Haganah", EntityType::Organization),
            AuthorityRecord::new(3, "Magen David", EntityType::Organization),
            AuthorityRecord::new(4, "Magen David", EntityType::Person),
        ]
    }

    #[test]
    fn test_resolve_case_insensitive_exact() {
        let v = vocab();
        assert_eq!(resolve("golda meir", &v), Some(1));
        assert_eq!(resolve("GOLDA MEIR", &v), Some(1));
        assert_eq!(resolve("Golda", &v), None);
    }

    #[test]
    fn test_resolve_trims_whitespace() {
        let v = vocab();
        assert_eq!(resolve("  Haganah \n", &v), Some(2));
    }

    #[test]
    fn test_resolve_blank_is_none() {
        let v = vocab();
        assert_eq!(resolve("", &v), None);
        assert_eq!(resolve("   ", &v), None);
    }

    #[test]
    fn test_resolve_first_occurrence_wins_across_types() {
        // Name-only matching: the organization entry shadows the person
        // entry because it was inserted first.
        let v = vocab();
        assert_eq!(resolve("Magen David", &v), Some(3));
    }

    #[test]
    fn test_resolve_entry_returns_record() {
        let v = vocab();
        let entry = resolve_entry("haganah", &v).unwrap();
        assert_eq!(entry.name, "Haganah");
        assert_eq!(entry.entity_type, EntityType::Organization);
    }

    #[test]
    fn test_resolve_empty_vocabulary() {
        assert_eq!(resolve("Golda Meir", &[]), None);
    }
}
