use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slug fields
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "hakkimizda", "page123", "my-page-name"
    /// - Invalid: "-page", "page-", "page--name", "Page", "page_name"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("hakkimizda"));
        assert!(SLUG_REGEX.is_match("page123"));
        assert!(SLUG_REGEX.is_match("my-page-name"));
        assert!(SLUG_REGEX.is_match("a"));
        assert!(SLUG_REGEX.is_match("abc123"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-page")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("page-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("page--name")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Page")); // uppercase
        assert!(!SLUG_REGEX.is_match("page_name")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
        assert!(!SLUG_REGEX.is_match("page name")); // space
    }
}
