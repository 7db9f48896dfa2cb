/// Normalize a search query: trimmed and lowercased. Blank queries match
/// nothing, so they normalize to `None`.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Prefix match of a contact name against an already normalized query.
pub fn name_matches(name: &str, normalized: &str) -> bool {
    name.to_lowercase().starts_with(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  Jo "), Some("jo".to_string()));
        assert_eq!(normalize_query(""), None);
        assert_eq!(normalize_query(" \t"), None);
    }

    #[test]
    fn test_prefix_only() {
        assert!(name_matches("John", "jo"));
        assert!(name_matches("Joanna Smith", "joanna s"));
        assert!(!name_matches("Mark Jones", "jo"));
    }
}
