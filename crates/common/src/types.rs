//! Core types for Formgate

use serde::{Deserialize, Serialize};

/// Shared message shown while any mandatory control is invalid
pub const INPUT_ERROR_MESSAGE: &str = "Mandatory input field is not valid or empty!";

/// Dedicated message for a password/confirmation mismatch
pub const PASSWORD_ERROR_MESSAGE: &str = "Passwords do not match!";

/// Message shown after a successful submit
pub const SUCCESS_MESSAGE: &str = "User successfully submitted registration";

/// Box-shadow colour of a highlighted (invalid) mandatory field
pub const HIGHLIGHT_COLOR: &str = "rgb(255, 0, 0)";

/// Identifier of a text-like input field
pub type FieldId = String;

/// Kind of a text-like input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Tel,
}

impl Default for FieldKind {
    fn default() -> Self {
        Self::Text
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Email => write!(f, "email"),
            FieldKind::Password => write!(f, "password"),
            FieldKind::Tel => write!(f, "tel"),
        }
    }
}

/// One `<option>` of a select control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// The empty leading option of a dependent select
    pub fn placeholder() -> Self {
        Self::new("", "")
    }
}

/// Way of picking an option in a select control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionChoice {
    /// Match against the option value first, then the label
    Value(String),
    /// Zero-based position in the option list
    Index(usize),
}

impl std::fmt::Display for OptionChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionChoice::Value(v) => write!(f, "{}", v),
            OptionChoice::Index(i) => write!(f, "#{}", i),
        }
    }
}

impl OptionChoice {
    /// Resolve this choice against an option list
    pub fn resolve<'a>(&self, options: &'a [SelectOption]) -> Option<&'a SelectOption> {
        match self {
            OptionChoice::Index(i) => options.get(*i),
            OptionChoice::Value(v) => options
                .iter()
                .find(|o| &o.value == v)
                .or_else(|| options.iter().find(|o| &o.label == v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cars() -> Vec<SelectOption> {
        vec![
            SelectOption::new("volvo", "Volvo"),
            SelectOption::new("saab", "Saab"),
            SelectOption::new("opel", "Opel"),
            SelectOption::new("audi", "Audi"),
        ]
    }

    #[test]
    fn test_choice_by_label_resolves_value() {
        let options = cars();
        let picked = OptionChoice::Value("Saab".to_string()).resolve(&options).unwrap();
        assert_eq!(picked.value, "saab");
    }

    #[test]
    fn test_choice_value_takes_precedence_over_label() {
        let options = vec![SelectOption::new("a", "b"), SelectOption::new("b", "c")];
        let picked = OptionChoice::Value("b".to_string()).resolve(&options).unwrap();
        assert_eq!(picked.label, "c");
    }

    #[test]
    fn test_choice_by_index() {
        let options = cars();
        assert_eq!(OptionChoice::Index(3).resolve(&options).unwrap().value, "audi");
        assert!(OptionChoice::Index(4).resolve(&options).is_none());
    }
}
