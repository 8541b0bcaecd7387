//! Rename rules applied to property names when no explicit serialized name
//! is given.

use alloc::string::String;
use alloc::vec::Vec;

/// A case-conversion rule for serialized names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenameRule {
    /// `fieldName`
    CamelCase,
    /// `FieldName`
    PascalCase,
    /// `field_name`
    SnakeCase,
    /// `FIELD_NAME`
    ScreamingSnakeCase,
    /// `field-name`
    KebabCase,
    /// `fieldname`
    Lowercase,
    /// `FIELDNAME`
    Uppercase,
    /// Adds a fixed prefix.
    Prefix(&'static str),
    /// Adds a fixed suffix.
    Suffix(&'static str),
}

impl RenameRule {
    /// Applies the rule to a property name.
    pub fn apply(&self, name: &str) -> String {
        match self {
            RenameRule::CamelCase => {
                let mut out = String::with_capacity(name.len());
                for (i, word) in split_words(name).iter().enumerate() {
                    if i == 0 {
                        out.push_str(&word.to_lowercase());
                    } else {
                        push_capitalized(&mut out, word);
                    }
                }
                out
            }
            RenameRule::PascalCase => {
                let mut out = String::with_capacity(name.len());
                for word in split_words(name) {
                    push_capitalized(&mut out, &word);
                }
                out
            }
            RenameRule::SnakeCase => join_words(name, "_").to_lowercase(),
            RenameRule::ScreamingSnakeCase => join_words(name, "_").to_uppercase(),
            RenameRule::KebabCase => join_words(name, "-").to_lowercase(),
            RenameRule::Lowercase => name.to_lowercase(),
            RenameRule::Uppercase => name.to_uppercase(),
            RenameRule::Prefix(prefix) => alloc::format!("{prefix}{name}"),
            RenameRule::Suffix(suffix) => alloc::format!("{name}{suffix}"),
        }
    }
}

fn push_capitalized(out: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(&chars.as_str().to_lowercase());
    }
}

fn join_words(name: &str, separator: &str) -> String {
    split_words(name).join(separator)
}

/// Splits an identifier into words on `_`, `-`, spaces and case changes.
///
/// Runs of capitals stay together, so `HTTPServer` splits into `HTTP` and
/// `Server`.
fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(core::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(core::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_cases() {
        assert_eq!(RenameRule::SnakeCase.apply("firstName"), "first_name");
        assert_eq!(RenameRule::CamelCase.apply("first_name"), "firstName");
        assert_eq!(RenameRule::PascalCase.apply("first_name"), "FirstName");
        assert_eq!(RenameRule::KebabCase.apply("firstName"), "first-name");
        assert_eq!(RenameRule::ScreamingSnakeCase.apply("firstName"), "FIRST_NAME");
        assert_eq!(RenameRule::Lowercase.apply("FirstName"), "firstname");
        assert_eq!(RenameRule::Uppercase.apply("first"), "FIRST");
    }

    #[test]
    fn keeps_acronyms_together() {
        assert_eq!(RenameRule::SnakeCase.apply("HTTPServer"), "http_server");
        assert_eq!(RenameRule::SnakeCase.apply("userID"), "user_id");
        assert_eq!(RenameRule::KebabCase.apply("address2Line"), "address2-line");
    }

    #[test]
    fn adds_affixes() {
        assert_eq!(RenameRule::Prefix("x_").apply("name"), "x_name");
        assert_eq!(RenameRule::Suffix("_v2").apply("name"), "name_v2");
    }
}
