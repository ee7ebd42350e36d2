//! Headless form session
//!
//! Plays scenario steps against a [`Form`] the way a browser would drive
//! the rendered page, and answers assertions from the derived
//! [`FormStatus`](formgate_common::FormStatus).

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use formgate_common::{
    Form, FormEvent, FormLayout, OptionChoice, SelectOption, HIGHLIGHT_COLOR,
    INPUT_ERROR_MESSAGE, PASSWORD_ERROR_MESSAGE, SUCCESS_MESSAGE,
};

use crate::error::{E2eError, E2eResult};
use crate::selector::{Element, Selector};
use crate::spec::{Assertion, AttributeAssertion, TestStep};

/// Result of executing a test step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// One radio button or checkbox on the page
#[derive(Debug, Clone)]
struct Toggle {
    group: String,
    value: String,
    label: String,
    link: Option<String>,
}

/// A form driven by scenario steps
pub struct FormSession {
    form: Form,
}

impl FormSession {
    pub fn new(layout: Arc<FormLayout>) -> Self {
        Self {
            form: Form::new(layout),
        }
    }

    /// Execute one step. Failures are reported in the result, not as `Err`.
    pub fn execute_step(&mut self, step: &TestStep) -> StepResult {
        let start = Instant::now();
        let step_name = step.name();

        debug!("Executing step: {}", step_name);

        let result = self.apply(step);
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => StepResult {
                success: true,
                step_name,
                duration_ms,
                error: None,
            },
            Err(e) => StepResult {
                success: false,
                step_name,
                duration_ms,
                error: Some(e.to_string()),
            },
        }
    }

    fn apply(&mut self, step: &TestStep) -> E2eResult<()> {
        match step {
            TestStep::Fill { selector, value } => {
                let field = self.field(selector)?;
                self.form.dispatch(FormEvent::Input {
                    field,
                    value: value.clone(),
                })?;
            }
            TestStep::Type { selector, text } => {
                let field = self.field(selector)?;
                self.form.dispatch(FormEvent::Append {
                    field,
                    text: text.clone(),
                })?;
            }
            TestStep::Clear { selector } => {
                let field = self.field(selector)?;
                self.form.dispatch(FormEvent::Clear { field })?;
            }
            TestStep::Blur => self.form.blur()?,
            TestStep::Click { selector } => match self.resolve(selector)? {
                Element::SubmitButton => self.submit(step)?,
                // focus moves to whatever was clicked
                _ => self.form.blur()?,
            },
            TestStep::Select {
                selector,
                value,
                index,
            } => {
                let choice = match (value, index) {
                    (Some(value), None) => OptionChoice::Value(value.clone()),
                    (None, Some(index)) => OptionChoice::Index(*index),
                    _ => {
                        return Err(E2eError::StepFailed {
                            step: step.name(),
                            reason: "select needs exactly one of value or index".to_string(),
                        })
                    }
                };
                self.select(selector, choice)?;
            }
            TestStep::Check {
                selector,
                value,
                index,
            } => {
                let toggle = self.toggle(selector, value.as_deref(), *index)?;
                let event = match self.resolve(selector)? {
                    Element::Radios(_) => FormEvent::ChooseRadio {
                        group: toggle.group,
                        value: toggle.value,
                    },
                    _ => FormEvent::SetCheckbox {
                        group: toggle.group,
                        value: toggle.value,
                        checked: true,
                    },
                };
                self.form.dispatch(event)?;
            }
            TestStep::Uncheck {
                selector,
                value,
                index,
            } => {
                if let Element::Radios(_) = self.resolve(selector)? {
                    return Err(E2eError::StepFailed {
                        step: step.name(),
                        reason: "radio buttons cannot be unchecked".to_string(),
                    });
                }
                let toggle = self.toggle(selector, value.as_deref(), *index)?;
                self.form.dispatch(FormEvent::SetCheckbox {
                    group: toggle.group,
                    value: toggle.value,
                    checked: false,
                })?;
            }
            TestStep::Submit => self.submit(step)?,
            TestStep::Assert(assertion) => self.check(assertion)?,
            TestStep::Log { message } => info!("{}", message),
        }
        Ok(())
    }

    fn resolve(&self, selector: &str) -> E2eResult<Element> {
        Selector::parse(selector)?.resolve(self.form.layout())
    }

    fn field(&self, selector: &str) -> E2eResult<String> {
        match self.resolve(selector)? {
            Element::Field(id) => Ok(id),
            other => Err(E2eError::Selector(format!(
                "{} is not an input field ({:?})",
                selector, other
            ))),
        }
    }

    fn submit(&mut self, step: &TestStep) -> E2eResult<()> {
        if !self.form.status().submit_enabled {
            return Err(E2eError::StepFailed {
                step: step.name(),
                reason: "submit button is disabled".to_string(),
            });
        }
        self.form.submit()?;
        Ok(())
    }

    fn select(&mut self, selector: &str, choice: OptionChoice) -> E2eResult<()> {
        let element = self.resolve(selector)?;
        let options = self.options(&element, selector)?;
        let option = choice
            .resolve(&options)
            .ok_or_else(|| E2eError::Selector(format!("{} has no option {}", selector, choice)))?
            .value
            .clone();

        let event = match element {
            Element::Country => FormEvent::SelectCountry { country: option },
            Element::City => FormEvent::SelectCity { city: option },
            Element::Select(select) => FormEvent::SelectOption {
                select,
                choice: OptionChoice::Value(option),
            },
            other => {
                return Err(E2eError::Selector(format!(
                    "{} is not a select ({:?})",
                    selector, other
                )))
            }
        };
        self.form.dispatch(event)?;
        Ok(())
    }

    fn options(&self, element: &Element, selector: &str) -> E2eResult<Vec<SelectOption>> {
        match element {
            Element::Country => Ok(self.form.country_options()),
            Element::City => Ok(self.form.city_options()),
            Element::Select(id) => Ok(self
                .form
                .layout()
                .select(id)
                .map(|s| s.options.clone())
                .unwrap_or_default()),
            _ => Err(E2eError::Selector(format!("{} is not a select", selector))),
        }
    }

    /// Radio buttons or checkboxes an element stands for, in page order
    fn toggles(&self, element: &Element) -> Vec<Toggle> {
        let layout = self.form.layout();
        match element {
            Element::Radios(group) => layout
                .radio_groups
                .iter()
                .filter(|g| group.as_ref().map(|name| &g.name == name).unwrap_or(true))
                .flat_map(|g| {
                    g.options.iter().map(move |o| Toggle {
                        group: g.name.clone(),
                        value: o.value.clone(),
                        label: o.label.clone(),
                        link: None,
                    })
                })
                .collect(),
            Element::Checkboxes(group) => layout
                .checkbox_groups
                .iter()
                .filter(|g| group.as_ref().map(|name| &g.name == name).unwrap_or(true))
                .flat_map(|g| {
                    g.boxes.iter().map(move |b| Toggle {
                        group: g.name.clone(),
                        value: b.value.clone(),
                        label: b.label.clone(),
                        link: b.link.clone(),
                    })
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn toggle(&self, selector: &str, value: Option<&str>, index: Option<usize>) -> E2eResult<Toggle> {
        let element = self.resolve(selector)?;
        let mut toggles = self.toggles(&element);
        if toggles.is_empty() {
            return Err(E2eError::Selector(format!(
                "{} is not a radio button or checkbox",
                selector
            )));
        }

        let position = match (value, index) {
            (Some(value), _) => toggles.iter().position(|t| t.value == value),
            (None, Some(index)) => (index < toggles.len()).then_some(index),
            (None, None) if toggles.len() == 1 => Some(0),
            (None, None) => {
                return Err(E2eError::Selector(format!(
                    "{} matches {} elements; pick one with value or index",
                    selector,
                    toggles.len()
                )))
            }
        };
        position
            .map(|i| toggles.swap_remove(i))
            .ok_or_else(|| E2eError::Selector(format!("no matching element in {}", selector)))
    }

    fn is_checked(&self, toggle: &Toggle) -> bool {
        let state = self.form.state();
        state.radios.get(&toggle.group) == Some(&toggle.value)
            || state.is_checked(&toggle.group, &toggle.value)
    }

    /// Text content an assertion compares against
    fn text(&self, element: &Element, toggle: Option<&Toggle>) -> String {
        if let Some(toggle) = toggle {
            return toggle.label.clone();
        }
        let state = self.form.state();
        match element {
            Element::Field(id) => state.value(id).to_string(),
            Element::InputErrorMessage => INPUT_ERROR_MESSAGE.to_string(),
            Element::PasswordErrorMessage => PASSWORD_ERROR_MESSAGE.to_string(),
            Element::SuccessMessage => SUCCESS_MESSAGE.to_string(),
            Element::SubmitButton => "Submit".to_string(),
            Element::Heading => self.form.layout().title.clone(),
            Element::Select(_) | Element::Country | Element::City => {
                let value = self.value(element, None);
                self.options(element, "")
                    .unwrap_or_default()
                    .into_iter()
                    .find(|o| o.value == value)
                    .map(|o| o.label)
                    .unwrap_or_default()
            }
            Element::Radios(_) | Element::Checkboxes(_) => String::new(),
        }
    }

    /// Current `value` of a control
    fn value(&self, element: &Element, toggle: Option<&Toggle>) -> String {
        if let Some(toggle) = toggle {
            return toggle.value.clone();
        }
        let state = self.form.state();
        match element {
            Element::Field(id) => state.value(id).to_string(),
            Element::Select(id) => state.selects.get(id).cloned().unwrap_or_default(),
            Element::Country => state.location.country().unwrap_or("").to_string(),
            Element::City => state.location.city().unwrap_or("").to_string(),
            Element::Radios(Some(group)) => state.radios.get(group).cloned().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn attribute(&self, element: &Element, toggle: Option<&Toggle>, name: &str) -> Option<String> {
        if let Some(toggle) = toggle {
            return match name {
                "name" => Some(toggle.group.clone()),
                "value" => Some(toggle.value.clone()),
                "href" => toggle.link.clone(),
                "type" => Some(
                    match element {
                        Element::Radios(_) => "radio",
                        _ => "checkbox",
                    }
                    .to_string(),
                ),
                _ => None,
            };
        }
        match element {
            Element::Field(id) => {
                let spec = self.form.layout().field(id)?;
                match name {
                    "id" => Some(spec.id.clone()),
                    "title" => spec.tooltip.clone(),
                    "type" => Some(spec.kind.to_string()),
                    "value" => Some(self.form.value(id).to_string()),
                    _ => spec.attributes.get(name).cloned(),
                }
            }
            Element::SubmitButton => match name {
                "type" => Some("submit".to_string()),
                "disabled" if !self.form.status().submit_enabled => Some(String::new()),
                _ => None,
            },
            _ => None,
        }
    }

    fn check(&self, assertion: &Assertion) -> E2eResult<()> {
        let selector = assertion.selector.as_str();
        let element = self.resolve(selector)?;
        let picks = assertion.value.is_some() || assertion.index.is_some();
        let toggle = if picks {
            Some(self.toggle(selector, assertion.value.as_deref(), assertion.index)?)
        } else {
            None
        };
        let status = self.form.status();

        let fail = |what: &str,
                    expected: &dyn std::fmt::Debug,
                    actual: &dyn std::fmt::Debug|
         -> E2eResult<()> {
            Err(E2eError::AssertionFailed(format!(
                "{}: expected {} {:?}, got {:?}",
                selector, what, expected, actual
            )))
        };

        if let Some(expected) = assertion.visible {
            let actual = match element {
                Element::InputErrorMessage => status.input_error_visible,
                Element::PasswordErrorMessage => status.password_error_visible,
                Element::SuccessMessage => status.success_visible,
                _ => true,
            };
            if actual != expected {
                return fail("visible", &expected, &actual);
            }
        }

        if let Some(expected) = assertion.enabled {
            let actual = match element {
                Element::SubmitButton => status.submit_enabled,
                _ => true,
            };
            if actual != expected {
                return fail("enabled", &expected, &actual);
            }
        }

        let text = self.text(&element, toggle.as_ref());
        if let Some(expected) = &assertion.text {
            if &text != expected {
                return fail("text", expected, &text);
            }
        }
        if let Some(expected) = &assertion.text_contains {
            if !text.contains(expected.as_str()) {
                return fail("text containing", expected, &text);
            }
        }

        if let Some(expected) = &assertion.has_value {
            let actual = self.value(&element, toggle.as_ref());
            if &actual != expected {
                return fail("value", expected, &actual);
            }
        }

        if let Some(expected) = assertion.checked {
            let actual = match &toggle {
                Some(toggle) => self.is_checked(toggle),
                None => {
                    return Err(E2eError::AssertionFailed(format!(
                        "{}: 'checked' needs a value or index",
                        selector
                    )))
                }
            };
            if actual != expected {
                return fail("checked", &expected, &actual);
            }
        }

        if assertion.options.is_some() || assertion.option_values.is_some() {
            let options = self.options(&element, selector)?;
            if let Some(expected) = &assertion.options {
                let actual: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
                if &actual != expected {
                    return fail("options", expected, &actual);
                }
            }
            if let Some(expected) = &assertion.option_values {
                let actual: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                if &actual != expected {
                    return fail("option values", expected, &actual);
                }
            }
        }

        if let Some(AttributeAssertion {
            name,
            value,
            contains,
        }) = &assertion.attribute
        {
            let actual = self
                .attribute(&element, toggle.as_ref(), name)
                .ok_or_else(|| {
                    E2eError::AssertionFailed(format!("{}: no attribute '{}'", selector, name))
                })?;
            if let Some(expected) = value {
                if &actual != expected {
                    return fail(name, expected, &actual);
                }
            }
            if let Some(expected) = contains {
                if !actual.contains(expected.as_str()) {
                    return fail(name, expected, &actual);
                }
            }
        }

        if let Some(expected) = assertion.count {
            let actual = match &element {
                Element::Radios(_) | Element::Checkboxes(_) => self.toggles(&element).len(),
                Element::Select(_) | Element::Country | Element::City => {
                    self.options(&element, selector)?.len()
                }
                _ => 1,
            };
            if actual != expected {
                return fail("count", &expected, &actual);
            }
        }

        if let Some(expected) = assertion.highlighted {
            let actual = match &element {
                Element::Field(id) => status.field(id).map(|f| f.highlighted).unwrap_or(false),
                _ => false,
            };
            if actual != expected {
                let shadow = if actual { HIGHLIGHT_COLOR } else { "none" };
                return fail("highlighted", &expected, &shadow);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formgate_common::{registration_form_2, registration_form_3, FormConfig};

    fn session_2() -> FormSession {
        FormSession::new(Arc::new(
            registration_form_2(&FormConfig::default()).unwrap(),
        ))
    }

    fn session_3() -> FormSession {
        FormSession::new(Arc::new(
            registration_form_3(&FormConfig::default()).unwrap(),
        ))
    }

    fn run(session: &mut FormSession, steps: &[TestStep]) {
        for step in steps {
            let result = session.execute_step(step);
            assert!(result.success, "{} failed: {:?}", result.step_name, result.error);
        }
    }

    fn fill(selector: &str, value: &str) -> TestStep {
        TestStep::Fill {
            selector: selector.to_string(),
            value: value.to_string(),
        }
    }

    fn assert_step(assertion: Assertion) -> TestStep {
        TestStep::Assert(Box::new(assertion))
    }

    #[test]
    fn test_submit_with_mandatory_fields() {
        let mut session = session_2();
        run(
            &mut session,
            &[
                fill("input[data-testid=\"user\"]", "Test1"),
                fill("#email", "test@example.com"),
                fill("[data-cy=\"name\"]", "Kaie"),
                fill("#lastName", "Kukk"),
                fill("[data-testid=\"phoneNumberTestId\"]", "55512345"),
                TestStep::Blur,
                assert_step(Assertion {
                    selector: ".submit_button".to_string(),
                    enabled: Some(true),
                    ..Default::default()
                }),
                TestStep::Click {
                    selector: ".submit_button".to_string(),
                },
                assert_step(Assertion {
                    selector: "#success_message".to_string(),
                    visible: Some(true),
                    text_contains: Some("successfully".to_string()),
                    ..Default::default()
                }),
            ],
        );
    }

    #[test]
    fn test_disabled_submit_fails_step() {
        let mut session = session_2();
        let result = session.execute_step(&TestStep::Submit);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("disabled"));
    }

    #[test]
    fn test_failed_assertion_reports_values() {
        let mut session = session_2();
        let result = session.execute_step(&assert_step(Assertion {
            selector: "#input_error_message".to_string(),
            visible: Some(true),
            ..Default::default()
        }));
        assert!(!result.success);
        assert!(result.error.unwrap().contains("expected visible true"));
    }

    #[test]
    fn test_highlight_and_tooltip() {
        let mut session = session_2();
        run(
            &mut session,
            &[
                fill("#username", "Test1"),
                TestStep::Blur,
                assert_step(Assertion {
                    selector: "[data-testid=\"phoneNumberTestId\"]".to_string(),
                    highlighted: Some(true),
                    attribute: Some(AttributeAssertion {
                        name: "title".to_string(),
                        value: None,
                        contains: Some("Add phone number".to_string()),
                    }),
                    ..Default::default()
                }),
                assert_step(Assertion {
                    selector: "#username".to_string(),
                    highlighted: Some(false),
                    has_value: Some("Test1".to_string()),
                    ..Default::default()
                }),
            ],
        );
    }

    #[test]
    fn test_heading_shows_form_title() {
        let heading = |text: &str| {
            assert_step(Assertion {
                selector: "h1".to_string(),
                visible: Some(true),
                text: Some(text.to_string()),
                ..Default::default()
            })
        };
        run(&mut session_2(), &[heading("Registration form number 2")]);
        run(&mut session_3(), &[heading("Registration page")]);
    }

    #[test]
    fn test_radio_by_index() {
        let mut session = session_2();
        let radios = "input[type=\"radio\"]".to_string();
        run(
            &mut session,
            &[
                TestStep::Check {
                    selector: radios.clone(),
                    value: None,
                    index: Some(0),
                },
                TestStep::Check {
                    selector: radios.clone(),
                    value: None,
                    index: Some(1),
                },
                assert_step(Assertion {
                    selector: radios.clone(),
                    index: Some(0),
                    checked: Some(false),
                    text: Some("HTML".to_string()),
                    ..Default::default()
                }),
                assert_step(Assertion {
                    selector: radios.clone(),
                    index: Some(1),
                    checked: Some(true),
                    ..Default::default()
                }),
            ],
        );

        let result = session.execute_step(&TestStep::Uncheck {
            selector: radios,
            value: None,
            index: Some(1),
        });
        assert!(!result.success);
    }

    #[test]
    fn test_city_select_follows_country() {
        let mut session = session_3();
        run(
            &mut session,
            &[
                TestStep::Select {
                    selector: "#country".to_string(),
                    value: Some("Spain".to_string()),
                    index: None,
                },
                TestStep::Select {
                    selector: "#city".to_string(),
                    value: Some("Madrid".to_string()),
                    index: None,
                },
                assert_step(Assertion {
                    selector: "#city".to_string(),
                    has_value: Some("Madrid".to_string()),
                    ..Default::default()
                }),
                TestStep::Select {
                    selector: "#country".to_string(),
                    value: None,
                    index: Some(2),
                },
                assert_step(Assertion {
                    selector: "#country".to_string(),
                    text: Some("Estonia".to_string()),
                    ..Default::default()
                }),
                assert_step(Assertion {
                    selector: "#city".to_string(),
                    has_value: Some(String::new()),
                    options: Some(
                        ["", "Tallinn", "Haapsalu", "Tartu"]
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                    ),
                    ..Default::default()
                }),
            ],
        );

        let result = session.execute_step(&TestStep::Select {
            selector: "#city".to_string(),
            value: Some("Madrid".to_string()),
            index: None,
        });
        assert!(!result.success);
    }

    #[test]
    fn test_cookie_policy_link() {
        let mut session = session_3();
        run(
            &mut session,
            &[assert_step(Assertion {
                selector: "[name=\"policies\"]".to_string(),
                value: Some("cookie".to_string()),
                text: Some("Accept our cookie policy".to_string()),
                attribute: Some(AttributeAssertion {
                    name: "href".to_string(),
                    value: Some("cookiePolicy.html".to_string()),
                    contains: None,
                }),
                ..Default::default()
            })],
        );
    }
}
