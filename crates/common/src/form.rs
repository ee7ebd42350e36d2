//! Form state machine
//!
//! [`transition`] maps `(layout, state, event)` to the next state and is the
//! only place state changes. [`evaluate`] derives everything a page shows
//! (field validity, highlight, messages, submit gate) from a state without
//! mutating it. [`Form`] bundles a shared layout with its current state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::dropdown::LocationState;
use crate::error::{Error, Result};
use crate::layout::{FormLayout, LocationSpec};
use crate::types::{FieldId, OptionChoice, SelectOption};
use crate::validator::{first_error, FieldError};

/// A user interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    /// Replace the value of a field
    Input { field: FieldId, value: String },
    /// Type text at the end of a field
    Append { field: FieldId, text: String },
    /// Empty a field
    Clear { field: FieldId },
    /// Focus left the active field (e.g. a click elsewhere on the page)
    Blur,
    SelectCountry { country: String },
    SelectCity { city: String },
    SelectOption { select: String, choice: OptionChoice },
    ChooseRadio { group: String, value: String },
    SetCheckbox { group: String, value: String, checked: bool },
    Submit,
    /// Return to the freshly loaded state
    Reset,
}

impl FormEvent {
    /// Events that change what the user entered
    pub fn is_mutation(&self) -> bool {
        !matches!(self, FormEvent::Blur | FormEvent::Submit | FormEvent::Reset)
    }
}

/// Everything the user has entered plus latched UI flags
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormState {
    pub values: BTreeMap<FieldId, String>,
    /// Radio group name → selected value
    pub radios: BTreeMap<String, String>,
    /// Checkbox group name → checked values
    pub checked: BTreeMap<String, BTreeSet<String>>,
    /// Select id → selected value
    pub selects: BTreeMap<String, String>,
    pub location: LocationState,
    /// At least one interaction has triggered validation
    pub evaluated: bool,
    /// Latched on blur
    pub password_error_visible: bool,
    pub submitted: bool,
}

impl FormState {
    /// State right after the page loaded
    pub fn initial(layout: &FormLayout) -> Self {
        Self {
            values: layout
                .fields
                .iter()
                .map(|f| (f.id.clone(), String::new()))
                .collect(),
            selects: layout
                .selects
                .iter()
                .filter_map(|s| s.options.first().map(|o| (s.id.clone(), o.value.clone())))
                .collect(),
            ..Default::default()
        }
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn is_checked(&self, group: &str, value: &str) -> bool {
        self.checked
            .get(group)
            .map(|values| values.contains(value))
            .unwrap_or(false)
    }
}

/// Derived status of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStatus {
    pub id: FieldId,
    pub mandatory: bool,
    /// Reported for optional fields too, but only mandatory ones gate submit
    pub error: Option<FieldError>,
    /// Red box-shadow on an invalid mandatory field
    pub highlighted: bool,
    pub tooltip: Option<String>,
}

impl FieldStatus {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Invalid mandatory field; mismatches are tracked by the password pair
    pub fn blocks_submit(&self) -> bool {
        self.mandatory && self.error.as_ref().map(|e| !e.is_mismatch()).unwrap_or(false)
    }
}

/// Derived status of the whole form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormStatus {
    pub fields: Vec<FieldStatus>,
    /// Country and city chosen, or the layout does not require them
    pub location_valid: bool,
    /// Required checkboxes left unchecked, as `group/value`
    pub unchecked_required: Vec<String>,
    pub password_mismatch: bool,
    pub submit_enabled: bool,
    pub input_error_visible: bool,
    pub password_error_visible: bool,
    pub success_visible: bool,
}

impl FormStatus {
    pub fn field(&self, id: &str) -> Option<&FieldStatus> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Human-readable reason the gate is closed, if it is
    pub fn blocked_reason(&self) -> Option<String> {
        if self.submit_enabled {
            return None;
        }
        if let Some(field) = self.fields.iter().find(|f| f.blocks_submit()) {
            return field.error.as_ref().map(|e| format!("{}: {}", field.id, e));
        }
        if !self.location_valid {
            return Some("country and city must be selected".to_string());
        }
        if let Some(checkbox) = self.unchecked_required.first() {
            return Some(format!("{} must be checked", checkbox));
        }
        if self.password_mismatch {
            return Some(crate::types::PASSWORD_ERROR_MESSAGE.to_string());
        }
        None
    }
}

/// Derive the displayed status of `state`
pub fn evaluate(layout: &FormLayout, state: &FormState) -> FormStatus {
    let fields: Vec<FieldStatus> = layout
        .fields
        .iter()
        .map(|spec| {
            let error = first_error(
                &spec.validators,
                &spec.label,
                state.value(&spec.id),
                &state.values,
            );
            let mut status = FieldStatus {
                id: spec.id.clone(),
                mandatory: spec.mandatory,
                error,
                highlighted: false,
                tooltip: spec.tooltip.clone(),
            };
            status.highlighted = state.evaluated && status.blocks_submit();
            status
        })
        .collect();

    let location_valid = match &layout.location {
        Some(LocationSpec { required: true, .. }) => state.location.is_complete(),
        _ => true,
    };

    let unchecked_required: Vec<String> = layout
        .checkbox_groups
        .iter()
        .flat_map(|group| {
            group
                .boxes
                .iter()
                .filter(move |b| b.required && !state.is_checked(&group.name, &b.value))
                .map(move |b| format!("{}/{}", group.name, b.value))
        })
        .collect();

    let mandatory_invalid = fields.iter().any(FieldStatus::blocks_submit)
        || !location_valid
        || !unchecked_required.is_empty();
    let password_mismatch = fields
        .iter()
        .any(|f| f.error.as_ref().map(FieldError::is_mismatch).unwrap_or(false));

    FormStatus {
        fields,
        location_valid,
        unchecked_required,
        password_mismatch,
        submit_enabled: !mandatory_invalid && !password_mismatch,
        input_error_visible: state.evaluated && mandatory_invalid,
        password_error_visible: state.password_error_visible,
        success_visible: state.submitted,
    }
}

fn location(layout: &FormLayout) -> Result<&LocationSpec> {
    layout
        .location
        .as_ref()
        .ok_or_else(|| Error::unknown("control", "country"))
}

fn field_mut<'a>(layout: &FormLayout, state: &'a mut FormState, id: &str) -> Result<&'a mut String> {
    if layout.field(id).is_none() {
        return Err(Error::unknown("field", id));
    }
    Ok(state.values.entry(id.to_string()).or_default())
}

/// Apply `event` to `state`. Rejected events leave `state` untouched and
/// return the reason.
pub fn transition(layout: &FormLayout, state: &FormState, event: &FormEvent) -> Result<FormState> {
    let mut next = state.clone();

    match event {
        FormEvent::Input { field, value } => {
            *field_mut(layout, &mut next, field)? = value.clone();
        }
        FormEvent::Append { field, text } => {
            field_mut(layout, &mut next, field)?.push_str(text);
        }
        FormEvent::Clear { field } => {
            field_mut(layout, &mut next, field)?.clear();
        }
        FormEvent::Blur => {
            next.password_error_visible = evaluate(layout, &next).password_mismatch;
        }
        FormEvent::SelectCountry { country } => {
            let spec = location(layout)?;
            next.location = state.location.select_country(&spec.catalog, country)?;
        }
        FormEvent::SelectCity { city } => {
            let spec = location(layout)?;
            next.location = state.location.select_city(&spec.catalog, city)?;
        }
        FormEvent::SelectOption { select, choice } => {
            let spec = layout
                .select(select)
                .ok_or_else(|| Error::unknown("select", select.as_str()))?;
            let option = choice
                .resolve(&spec.options)
                .ok_or_else(|| Error::UnknownOption {
                    select: select.clone(),
                    choice: choice.to_string(),
                })?;
            next.selects.insert(select.clone(), option.value.clone());
        }
        FormEvent::ChooseRadio { group, value } => {
            let spec = layout
                .radio_group(group)
                .ok_or_else(|| Error::unknown("radio group", group.as_str()))?;
            if !spec.has_option(value) {
                return Err(Error::UnknownOption {
                    select: group.clone(),
                    choice: value.clone(),
                });
            }
            next.radios.insert(group.clone(), value.clone());
        }
        FormEvent::SetCheckbox {
            group,
            value,
            checked,
        } => {
            let spec = layout
                .checkbox_group(group)
                .ok_or_else(|| Error::unknown("checkbox group", group.as_str()))?;
            if spec.checkbox(value).is_none() {
                return Err(Error::UnknownOption {
                    select: group.clone(),
                    choice: value.clone(),
                });
            }
            let values = next.checked.entry(group.clone()).or_default();
            if *checked {
                values.insert(value.clone());
            } else {
                values.remove(value);
            }
        }
        FormEvent::Submit => {
            next.evaluated = true;
            let status = evaluate(layout, &next);
            if let Some(reason) = status.blocked_reason() {
                return Err(Error::SubmitBlocked(reason));
            }
            next.submitted = true;
            return Ok(next);
        }
        FormEvent::Reset => return Ok(FormState::initial(layout)),
    }

    next.evaluated = true;
    if event.is_mutation() {
        next.submitted = false;
    }
    Ok(next)
}

/// A live form: a shared layout and its current state
#[derive(Debug, Clone)]
pub struct Form {
    layout: Arc<FormLayout>,
    state: FormState,
}

impl Form {
    pub fn new(layout: Arc<FormLayout>) -> Self {
        let state = FormState::initial(&layout);
        Self { layout, state }
    }

    pub fn layout(&self) -> &FormLayout {
        &self.layout
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn status(&self) -> FormStatus {
        evaluate(&self.layout, &self.state)
    }

    /// Apply an event; on rejection the state is kept and the error returned
    pub fn dispatch(&mut self, event: FormEvent) -> Result<()> {
        debug!("{}: {:?}", self.layout.name, event);
        match transition(&self.layout, &self.state, &event) {
            Ok(next) => {
                self.state = next;
                Ok(())
            }
            Err(e) => {
                warn!("{}: rejected {:?}: {}", self.layout.name, event, e);
                Err(e)
            }
        }
    }

    pub fn fill(&mut self, field: &str, value: &str) -> Result<()> {
        self.dispatch(FormEvent::Input {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    pub fn clear(&mut self, field: &str) -> Result<()> {
        self.dispatch(FormEvent::Clear {
            field: field.to_string(),
        })
    }

    pub fn blur(&mut self) -> Result<()> {
        self.dispatch(FormEvent::Blur)
    }

    pub fn submit(&mut self) -> Result<()> {
        self.dispatch(FormEvent::Submit)
    }

    pub fn select_country(&mut self, country: &str) -> Result<()> {
        self.dispatch(FormEvent::SelectCountry {
            country: country.to_string(),
        })
    }

    pub fn select_city(&mut self, city: &str) -> Result<()> {
        self.dispatch(FormEvent::SelectCity {
            city: city.to_string(),
        })
    }

    pub fn country_options(&self) -> Vec<SelectOption> {
        self.layout
            .location
            .as_ref()
            .map(|l| l.catalog.country_options())
            .unwrap_or_default()
    }

    pub fn city_options(&self) -> Vec<SelectOption> {
        self.layout
            .location
            .as_ref()
            .map(|l| self.state.location.city_options(&l.catalog))
            .unwrap_or_default()
    }

    pub fn value(&self, field: &str) -> &str {
        self.state.value(field)
    }
}
