//! Formgate Common Library
//!
//! Validation rules, dependent dropdowns, and the form state machine behind
//! the registration pages.

use std::path::PathBuf;

pub mod catalog;
pub mod config;
pub mod dropdown;
pub mod error;
pub mod form;
pub mod layout;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use catalog::{Country, CountryCityCatalog};
pub use config::FormConfig;
pub use dropdown::LocationState;
pub use error::{Error, Result};
pub use form::{evaluate, transition, FieldStatus, Form, FormEvent, FormState, FormStatus};
pub use layout::{registration_form_2, registration_form_3, FormLayout, Layouts};
pub use types::*;
pub use validator::{FieldError, Validator};

/// Formgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default directory for user configuration
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".formgate")
}

/// Default form data file, read by the scenario harness when no path is given
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("forms.toml")
}
