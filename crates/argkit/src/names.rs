//! Script and command name validation.

/// Whether `name` can be used as a script or command name.
///
/// A name is a single word: non-empty and free of whitespace.
pub fn is_valid_script_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::is_valid_script_name;

    #[test]
    fn accepts_single_words() {
        assert!(is_valid_script_name("npm"));
        assert!(is_valid_script_name("a.b_"));
        assert!(is_valid_script_name("my-command"));
        assert!(is_valid_script_name("cmd1"));
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(!is_valid_script_name(""));
        assert!(!is_valid_script_name("a b"));
        assert!(!is_valid_script_name("tab\there"));
    }
}
