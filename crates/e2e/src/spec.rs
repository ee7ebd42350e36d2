//! Declarative YAML test specification

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// A complete test specification parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    /// Unique name for this test
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering tests
    #[serde(default)]
    pub tags: Vec<String>,

    /// Layout the scenario drives, e.g. `registration_form_2`
    pub form: String,

    /// Steps to execute in order
    pub steps: Vec<TestStep>,
}

/// A single step in a test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Replace the value of an input field
    Fill { selector: String, value: String },

    /// Type text at the end of an input field
    Type { selector: String, text: String },

    /// Empty an input field
    Clear { selector: String },

    /// Click somewhere outside the active field
    Blur,

    /// Click an element
    Click { selector: String },

    /// Select an option from a dropdown, by value/label or position
    Select {
        selector: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        index: Option<usize>,
    },

    /// Check a checkbox or radio button
    Check {
        selector: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        index: Option<usize>,
    },

    /// Uncheck a checkbox
    Uncheck {
        selector: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        index: Option<usize>,
    },

    /// Click the submit button
    Submit,

    /// Assert something about an element
    Assert(Box<Assertion>),

    /// Log a message (for debugging)
    Log { message: String },
}

/// Expectations about one element; unset fields are not checked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assertion {
    pub selector: String,
    /// Picks one radio button or checkbox by value
    #[serde(default)]
    pub value: Option<String>,
    /// Picks one radio button or checkbox by position
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub text_contains: Option<String>,
    /// Current value of a field or select
    #[serde(default)]
    pub has_value: Option<String>,
    #[serde(default)]
    pub checked: Option<bool>,
    /// Option labels, in order
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Option values, in order
    #[serde(default)]
    pub option_values: Option<Vec<String>>,
    #[serde(default)]
    pub attribute: Option<AttributeAssertion>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub highlighted: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeAssertion {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub contains: Option<String>,
}

impl TestStep {
    /// Short label used in logs and results
    pub fn name(&self) -> String {
        match self {
            TestStep::Fill { selector, .. } => format!("fill:{}", selector),
            TestStep::Type { selector, .. } => format!("type:{}", selector),
            TestStep::Clear { selector } => format!("clear:{}", selector),
            TestStep::Blur => "blur".to_string(),
            TestStep::Click { selector } => format!("click:{}", selector),
            TestStep::Select { selector, .. } => format!("select:{}", selector),
            TestStep::Check { selector, .. } => format!("check:{}", selector),
            TestStep::Uncheck { selector, .. } => format!("uncheck:{}", selector),
            TestStep::Submit => "submit".to_string(),
            TestStep::Assert(assertion) => format!("assert:{}", assertion.selector),
            TestStep::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }
}

impl TestSpec {
    /// Parse a test spec from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a test spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all test specs from a directory, sorted by file path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let spec = Self::from_file(entry.path())?;
            specs.push(spec);
        }

        Ok(specs)
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_spec() {
        let yaml = r#"
name: password-mismatch
description: Mismatching confirmation blocks submit
tags:
  - password
  - smoke
form: registration_form_2
steps:
  - action: fill
    selector: '#password'
    value: Password1234
  - action: type
    selector: '#confirm'
    text: Password12
  - action: blur
  - action: assert
    selector: .submit_button
    enabled: false
"#;
        let spec = TestSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.name, "password-mismatch");
        assert_eq!(spec.form, "registration_form_2");
        assert_eq!(spec.steps.len(), 4);
        assert!(matches!(spec.steps[2], TestStep::Blur));
        match &spec.steps[3] {
            TestStep::Assert(assertion) => {
                assert_eq!(assertion.selector, ".submit_button");
                assert_eq!(assertion.enabled, Some(false));
                assert!(assertion.visible.is_none());
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_parse_select_and_check() {
        let yaml = r#"
name: controls
form: registration_form_2
steps:
  - action: select
    selector: '#animal'
    index: 3
  - action: check
    selector: '[type="checkbox"]'
    value: Car
  - action: assert
    selector: '#animal'
    has_value: hippo
    option_values: [dog, cat, snake, hippo, cow, mouse]
"#;
        let spec = TestSpec::from_yaml(yaml).unwrap();
        assert!(matches!(
            spec.steps[0],
            TestStep::Select { index: Some(3), value: None, .. }
        ));
        assert_eq!(spec.steps[1].name(), "check:[type=\"checkbox\"]");
    }

    #[test]
    fn test_missing_form_is_rejected() {
        let yaml = "name: orphan\nsteps: []\n";
        assert!(TestSpec::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_load_all_and_filter() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("b.yaml"),
            "name: b\nform: registration_form_3\ntags: [location]\nsteps: []\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.yml"),
            "name: a\nform: registration_form_2\nsteps: []\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let specs = TestSpec::load_all(dir.path()).unwrap();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let tagged = TestSpec::filter_by_tag(&specs, "location");
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].name, "b");
    }
}
