//! Identifier case conversion for parameter and flag names.

/// Convert a free-form name into the camel-case key used in parsed results.
///
/// Runs of `-`, `_` and spaces are dropped and the character after them is
/// upper-cased. Trailing separators are removed. Nothing else changes case, so
/// `FileNAME` stays `FileNAME` and a leading separator capitalizes the first
/// letter (`-value` becomes `Value`).
pub fn camel_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut upper_next = false;
    for c in word.chars() {
        if is_separator(c) {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a camel-case flag key into its displayed kebab-case form.
///
/// An upper-case ASCII letter preceded by a word character gets a `-` in
/// front of it, then the whole string is lower-cased (`flagA` -> `flag-a`).
pub fn kebab_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    let mut prev: Option<char> = None;
    for c in word.chars() {
        if c.is_ascii_uppercase() && prev.is_some_and(is_word_char) {
            out.push('-');
        }
        out.extend(c.to_lowercase());
        prev = Some(c);
    }
    out
}

fn is_separator(c: char) -> bool {
    matches!(c, '-' | '_' | ' ')
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_collapses_separators() {
        assert_eq!(camel_case("hello world"), "helloWorld");
        assert_eq!(camel_case("hello-world"), "helloWorld");
        assert_eq!(camel_case("hello_world"), "helloWorld");
        assert_eq!(camel_case("hello--world"), "helloWorld");
        assert_eq!(camel_case("hello__world"), "helloWorld");
        assert_eq!(camel_case("value_name-here"), "valueNameHere");
    }

    #[test]
    fn camel_case_edges() {
        assert_eq!(camel_case("-hello"), "Hello");
        assert_eq!(camel_case("hello-"), "hello");
        assert_eq!(camel_case("myValue"), "myValue");
        assert_eq!(camel_case("value1"), "value1");
        assert_eq!(camel_case("1value"), "1value");
        assert_eq!(camel_case("FileNAME"), "FileNAME");
    }

    #[test]
    fn kebab_case_splits_on_upper() {
        assert_eq!(kebab_case("flagA"), "flag-a");
        assert_eq!(kebab_case("outputDir"), "output-dir");
        assert_eq!(kebab_case("help"), "help");
        assert_eq!(kebab_case("Help"), "help");
        assert_eq!(kebab_case("already-kebab"), "already-kebab");
    }
}
