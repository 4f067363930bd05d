//! Slug derivation
//!
//! Slugs are the storage keys for NPCs and campaigns:
//! - Lowercase
//! - Punctuation dropped
//! - Runs of whitespace, underscores and hyphens collapse to one hyphen
//! - No leading or trailing hyphens

use regex::Regex;
use std::sync::LazyLock;

/// Characters that are dropped outright
static STRIP_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

/// Separator runs that become a single hyphen
static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_-]+").unwrap());

/// Derive a slug from a display name.
///
/// # Examples
/// ```
/// use rpgd::world::slugify;
///
/// assert_eq!(slugify("Steve the Blacksmith"), "steve-the-blacksmith");
/// assert_eq!(slugify("Steve's Campaign!"), "steves-campaign");
/// ```
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = STRIP_REGEX.replace_all(&lowered, "");
    let joined = SEPARATOR_REGEX.replace_all(&stripped, "-");
    joined.trim_matches('-').to_string()
}

/// Whether two names refer to the same slug
pub fn same_slug(a: &str, b: &str) -> bool {
    slugify(a) == slugify(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_special_chars() {
        assert_eq!(slugify("Steve's Campaign!"), "steves-campaign");
    }

    #[test]
    fn test_separators_collapse() {
        assert_eq!(slugify("The   Big   Quest"), "the-big-quest");
        assert_eq!(slugify("snake_case_name"), "snake-case-name");
        assert_eq!(slugify("--My--Cool--Campaign--"), "my-cool-campaign");
    }

    #[test]
    fn test_trimmed() {
        assert_eq!(slugify("  trimmed  "), "trimmed");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_same_slug() {
        assert!(same_slug("Goblin", "goblin"));
        assert!(same_slug("Marcus the Guard", "marcus-the-guard"));
        assert!(!same_slug("Marcus", "Marcia"));
    }
}
