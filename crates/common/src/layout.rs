//! Form layouts
//!
//! A layout is the static description of one registration page: its fields,
//! their rules, and the other controls on it. Layouts are built once and
//! shared by every [`crate::form::Form`] created from them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::catalog::CountryCityCatalog;
use crate::config::FormConfig;
use crate::error::{Error, Result};
use crate::types::{FieldId, FieldKind, SelectOption};
use crate::validator::Validator;

/// Tooltip shared by most mandatory text fields
pub const INPUT_FIELD_TOOLTIP: &str = "Input field";

/// A text-like input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub id: FieldId,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub validators: Vec<Validator>,
    /// `title` attribute describing the requirement
    #[serde(default)]
    pub tooltip: Option<String>,
    /// Extra attributes a selector may match on (`name`, `data-testid`, ...)
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl FieldSpec {
    pub fn new(id: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            mandatory: false,
            validators: Vec::new(),
            tooltip: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn text(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldKind::Text)
    }

    /// An email field with format validation
    pub fn email(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldKind::Email).with_validator(Validator::EmailFormat)
    }

    pub fn password(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldKind::Password)
    }

    /// Mark the field mandatory; the emptiness check always runs first
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        if !self.validators.contains(&Validator::NonEmpty) {
            self.validators.insert(0, Validator::NonEmpty);
        }
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = Some(tooltip.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }
}

/// Password and confirmation fields that must match when used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPair {
    pub password: FieldId,
    pub confirmation: FieldId,
}

/// Radio buttons sharing one `name`; at most one is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioGroup {
    pub name: String,
    pub options: Vec<SelectOption>,
}

impl RadioGroup {
    pub fn new(name: &str, options: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            options: options
                .iter()
                .map(|(value, label)| SelectOption::new(*value, *label))
                .collect(),
        }
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// One checkbox of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxSpec {
    pub value: String,
    pub label: String,
    /// Target of a link inside the label
    #[serde(default)]
    pub link: Option<String>,
    /// Submitting requires this box to be checked
    #[serde(default)]
    pub required: bool,
}

impl CheckboxSpec {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            link: None,
            required: false,
        }
    }

    pub fn with_link(mut self, href: &str) -> Self {
        self.link = Some(href.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Independent checkboxes sharing one `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxGroup {
    pub name: String,
    pub boxes: Vec<CheckboxSpec>,
}

impl CheckboxGroup {
    pub fn new(name: &str, boxes: Vec<CheckboxSpec>) -> Self {
        Self {
            name: name.to_string(),
            boxes,
        }
    }

    pub fn checkbox(&self, value: &str) -> Option<&CheckboxSpec> {
        self.boxes.iter().find(|b| b.value == value)
    }
}

/// A select with a fixed option list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectSpec {
    pub id: String,
    pub label: String,
    pub options: Vec<SelectOption>,
}

/// The dependent country/city pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSpec {
    pub catalog: Arc<CountryCityCatalog>,
    /// Submitting requires a country and one of its cities
    pub required: bool,
}

/// Static description of one form page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLayout {
    pub name: String,
    pub title: String,
    pub fields: Vec<FieldSpec>,
    pub password_pair: Option<PasswordPair>,
    pub radio_groups: Vec<RadioGroup>,
    pub checkbox_groups: Vec<CheckboxGroup>,
    pub selects: Vec<SelectSpec>,
    pub location: Option<LocationSpec>,
}

impl FormLayout {
    pub fn new(name: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            fields: Vec::new(),
            password_pair: None,
            radio_groups: Vec::new(),
            checkbox_groups: Vec::new(),
            selects: Vec::new(),
            location: None,
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a password/confirmation pair. The confirmation field gets an
    /// `Equals(password)` rule.
    pub fn with_password_pair(mut self, password: FieldSpec, confirmation: FieldSpec) -> Self {
        let pair = PasswordPair {
            password: password.id.clone(),
            confirmation: confirmation.id.clone(),
        };
        let confirmation = confirmation.with_validator(Validator::Equals(password.id.clone()));
        self.fields.push(password);
        self.fields.push(confirmation);
        self.password_pair = Some(pair);
        self
    }

    pub fn with_radio_group(mut self, group: RadioGroup) -> Self {
        self.radio_groups.push(group);
        self
    }

    pub fn with_checkbox_group(mut self, group: CheckboxGroup) -> Self {
        self.checkbox_groups.push(group);
        self
    }

    pub fn with_select(mut self, id: &str, label: &str, options: Vec<SelectOption>) -> Self {
        self.selects.push(SelectSpec {
            id: id.to_string(),
            label: label.to_string(),
            options,
        });
        self
    }

    pub fn with_location(mut self, catalog: Arc<CountryCityCatalog>, required: bool) -> Self {
        self.location = Some(LocationSpec { catalog, required });
        self
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn radio_group(&self, name: &str) -> Option<&RadioGroup> {
        self.radio_groups.iter().find(|g| g.name == name)
    }

    pub fn checkbox_group(&self, name: &str) -> Option<&CheckboxGroup> {
        self.checkbox_groups.iter().find(|g| g.name == name)
    }

    pub fn select(&self, id: &str) -> Option<&SelectSpec> {
        self.selects.iter().find(|s| s.id == id)
    }

    /// Check ids are unique and cross-field rules point at existing fields
    pub fn validate(&self) -> Result<()> {
        let mut ids = BTreeSet::new();
        let all_ids = self
            .fields
            .iter()
            .map(|f| f.id.as_str())
            .chain(self.radio_groups.iter().map(|g| g.name.as_str()))
            .chain(self.checkbox_groups.iter().map(|g| g.name.as_str()))
            .chain(self.selects.iter().map(|s| s.id.as_str()));
        for id in all_ids {
            if !ids.insert(id) {
                return Err(Error::InvalidConfig(format!(
                    "{}: duplicate control id '{}'",
                    self.name, id
                )));
            }
        }

        for field in &self.fields {
            for validator in &field.validators {
                if let Validator::Equals(other) = validator {
                    if self.field(other).is_none() {
                        return Err(Error::InvalidConfig(format!(
                            "{}: field '{}' must equal unknown field '{}'",
                            self.name, field.id, other
                        )));
                    }
                }
            }
        }

        if let Some(pair) = &self.password_pair {
            for id in [&pair.password, &pair.confirmation] {
                if self.field(id).is_none() {
                    return Err(Error::InvalidConfig(format!(
                        "{}: password pair references unknown field '{}'",
                        self.name, id
                    )));
                }
            }
        }

        for select in &self.selects {
            if select.options.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "{}: select '{}' has no options",
                    self.name, select.id
                )));
            }
        }
        Ok(())
    }
}

/// Registration form 2: personal details, optional password pair, and
/// unrelated radio/checkbox/select controls
pub fn registration_form_2(config: &FormConfig) -> Result<FormLayout> {
    let layout = FormLayout::new("registration_form_2", "Registration form number 2")
        .with_field(
            FieldSpec::text("username", "Username")
                .mandatory()
                .with_tooltip(INPUT_FIELD_TOOLTIP)
                .with_attr("name", "username")
                .with_attr("data-testid", "user"),
        )
        .with_field(
            FieldSpec::email("email", "Email")
                .mandatory()
                .with_tooltip(INPUT_FIELD_TOOLTIP)
                .with_attr("name", "email"),
        )
        .with_field(
            FieldSpec::text("firstName", "First name")
                .mandatory()
                .with_tooltip(INPUT_FIELD_TOOLTIP)
                .with_attr("name", "name")
                .with_attr("data-cy", "name"),
        )
        .with_field(
            FieldSpec::text("lastName", "Last name")
                .mandatory()
                .with_tooltip(INPUT_FIELD_TOOLTIP)
                .with_attr("name", "lastName"),
        )
        .with_field(
            FieldSpec::new("phoneNumber", "Phone number", FieldKind::Tel)
                .mandatory()
                .with_tooltip("Add phone number")
                .with_attr("name", "phone")
                .with_attr("data-testid", "phoneNumberTestId"),
        )
        .with_password_pair(
            FieldSpec::password("password", "Password").with_attr("name", "password"),
            FieldSpec::password("confirm", "Confirm password").with_attr("name", "confirm"),
        )
        .with_radio_group(RadioGroup::new(
            "fav_language",
            &[
                ("HTML", "HTML"),
                ("CSS", "CSS"),
                ("JavaScript", "JavaScript"),
                ("PHP", "PHP"),
            ],
        ))
        .with_checkbox_group(CheckboxGroup::new(
            "vehicle",
            vec![
                CheckboxSpec::new("Bike", "I have a bike"),
                CheckboxSpec::new("Car", "I have a car"),
                CheckboxSpec::new("Boat", "I have a boat"),
            ],
        ))
        .with_select("cars", "Car", config.options("cars")?)
        .with_select("animal", "Favourite animal", config.options("animal")?);

    layout.validate()?;
    Ok(layout)
}

/// Registration form 3: name, email, dependent country/city selection and
/// policy checkboxes
pub fn registration_form_3(config: &FormConfig) -> Result<FormLayout> {
    let catalog = Arc::new(config.catalog()?);
    let layout = FormLayout::new("registration_form_3", "Registration page")
        .with_field(
            FieldSpec::text("name", "Name")
                .mandatory()
                .with_attr("name", "name"),
        )
        .with_field(
            FieldSpec::email("email", "Email")
                .mandatory()
                .with_attr("name", "email"),
        )
        .with_location(catalog, true)
        .with_radio_group(RadioGroup::new(
            "freq",
            &[
                ("Daily", "Daily"),
                ("Weekly", "Weekly"),
                ("Monthly", "Monthly"),
                ("Never", "Never"),
            ],
        ))
        .with_checkbox_group(CheckboxGroup::new(
            "policies",
            vec![
                CheckboxSpec::new("privacy", "Accept our privacy policy").required(),
                CheckboxSpec::new("cookie", "Accept our cookie policy")
                    .with_link("cookiePolicy.html"),
            ],
        ));

    layout.validate()?;
    Ok(layout)
}

/// Named collection of layouts
#[derive(Debug, Clone, Default)]
pub struct Layouts {
    layouts: BTreeMap<String, Arc<FormLayout>>,
}

impl Layouts {
    /// The built-in registration forms
    pub fn builtin(config: &FormConfig) -> Result<Self> {
        let mut layouts = Self::default();
        layouts.insert(registration_form_2(config)?);
        layouts.insert(registration_form_3(config)?);
        Ok(layouts)
    }

    pub fn insert(&mut self, layout: FormLayout) {
        self.layouts.insert(layout.name.clone(), Arc::new(layout));
    }

    pub fn get(&self, name: &str) -> Result<Arc<FormLayout>> {
        self.layouts
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownLayout(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }
}
