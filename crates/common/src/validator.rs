//! Field validators
//!
//! Every field-level rule is one variant of [`Validator`] and is evaluated
//! through [`Validator::check`], so layouts describe rules as data instead of
//! attaching ad hoc predicates to individual fields.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::FieldId;

/// local-part "@" label ("." label)+, no whitespace, exactly one "@"
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is valid")
});

/// Returns true when `value` has the minimal `local@domain.tld` shape
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Returns true when `value` counts as empty for mandatory checks
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// A rule attached to a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum Validator {
    /// Value must not be blank
    NonEmpty,
    /// Non-blank value must look like an email address
    EmailFormat,
    /// Value must equal the value of another field
    Equals(FieldId),
}

/// Why a field is currently invalid
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum FieldError {
    #[error("{label} is required.")]
    Missing { label: String },

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Passwords do not match!")]
    Mismatch { other: FieldId },
}

impl FieldError {
    /// Mismatches have their own message and do not count towards the shared
    /// mandatory-field message.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, FieldError::Mismatch { .. })
    }
}

impl Validator {
    /// Check `value` against this rule. `values` holds the current value of
    /// every field in the form, for cross-field rules.
    pub fn check(
        &self,
        label: &str,
        value: &str,
        values: &BTreeMap<FieldId, String>,
    ) -> Result<(), FieldError> {
        match self {
            Validator::NonEmpty => {
                if is_blank(value) {
                    return Err(FieldError::Missing {
                        label: label.to_string(),
                    });
                }
            }
            Validator::EmailFormat => {
                if !is_blank(value) && !is_valid_email(value) {
                    return Err(FieldError::InvalidEmail);
                }
            }
            Validator::Equals(other) => {
                let other_value = values.get(other).map(String::as_str).unwrap_or("");
                if value != other_value {
                    return Err(FieldError::Mismatch {
                        other: other.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Run `validators` in order and return the first failure
pub fn first_error(
    validators: &[Validator],
    label: &str,
    value: &str,
    values: &BTreeMap<FieldId, String>,
) -> Option<FieldError> {
    validators
        .iter()
        .find_map(|v| v.check(label, value, values).err())
}
