//! CSS-like selectors resolved against a form layout
//!
//! Only the shapes the scenarios use are supported: `#id`, `.class`,
//! `[attr="value"]`, `tag[attr="value"]`, `tag#id`, the page heading `h1`
//! and a bare id.

use formgate_common::FormLayout;

use crate::error::{E2eError, E2eResult};

/// Page elements that exist on every form
pub const SUBMIT_BUTTON: &str = "submit_button";
pub const INPUT_ERROR_MESSAGE: &str = "input_error_message";
pub const PASSWORD_ERROR_MESSAGE: &str = "password_error_message";
pub const SUCCESS_MESSAGE: &str = "success_message";
pub const COUNTRY: &str = "country";
pub const CITY: &str = "city";
pub const HEADING: &str = "h1";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Matcher {
    Id(String),
    Tag(String),
    Class(String),
    Attr { name: String, value: String },
}

/// A parsed selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    matcher: Matcher,
}

/// What a selector points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Field(String),
    /// Radio buttons of one group, or every radio button on the page
    Radios(Option<String>),
    /// Checkboxes of one group, or every checkbox on the page
    Checkboxes(Option<String>),
    Select(String),
    Country,
    City,
    SubmitButton,
    InputErrorMessage,
    PasswordErrorMessage,
    SuccessMessage,
    /// Page title
    Heading,
}

impl Element {
    fn tag(&self) -> &'static str {
        match self {
            Element::Field(_) | Element::Radios(_) | Element::Checkboxes(_) => "input",
            Element::Select(_) | Element::Country | Element::City => "select",
            Element::SubmitButton => "button",
            Element::Heading => HEADING,
            _ => "div",
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl Selector {
    pub fn parse(input: &str) -> E2eResult<Self> {
        let input = input.trim();
        let invalid = || E2eError::Selector(format!("unsupported selector '{}'", input));

        let tag_end = input.find(|c: char| !is_name_char(c)).unwrap_or(input.len());
        let (tag, rest) = input.split_at(tag_end);

        if rest.is_empty() {
            if tag.is_empty() {
                return Err(invalid());
            }
            let matcher = if tag == HEADING {
                Matcher::Tag(tag.to_string())
            } else {
                Matcher::Id(tag.to_string())
            };
            return Ok(Self { tag: None, matcher });
        }

        let tag = (!tag.is_empty()).then(|| tag.to_string());
        let matcher = if let Some(id) = rest.strip_prefix('#') {
            if id.is_empty() || !id.chars().all(is_name_char) {
                return Err(invalid());
            }
            Matcher::Id(id.to_string())
        } else if let Some(class) = rest.strip_prefix('.') {
            if class.is_empty() || !class.chars().all(is_name_char) {
                return Err(invalid());
            }
            Matcher::Class(class.to_string())
        } else if let Some(body) = rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let (name, value) = body.split_once('=').ok_or_else(invalid)?;
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            let name = name.trim();
            if name.is_empty() || !name.chars().all(is_name_char) {
                return Err(invalid());
            }
            Matcher::Attr {
                name: name.to_string(),
                value: value.to_string(),
            }
        } else {
            return Err(invalid());
        };

        Ok(Self { tag, matcher })
    }

    /// Find the element this selector points at in `layout`
    pub fn resolve(&self, layout: &FormLayout) -> E2eResult<Element> {
        let element = match &self.matcher {
            Matcher::Id(id) => resolve_id(layout, id),
            Matcher::Tag(tag) if tag == HEADING => Some(Element::Heading),
            Matcher::Tag(_) => None,
            Matcher::Class(class) if class == SUBMIT_BUTTON => Some(Element::SubmitButton),
            Matcher::Class(_) => None,
            Matcher::Attr { name, value } => resolve_attr(layout, name, value),
        }
        .ok_or_else(|| E2eError::Selector(format!("no element matches {}", self)))?;

        match &self.tag {
            Some(tag) if tag != element.tag() => Err(E2eError::Selector(format!(
                "{} matches a <{}>, not a <{}>",
                self,
                element.tag(),
                tag
            ))),
            _ => Ok(element),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(tag) = &self.tag {
            write!(f, "{}", tag)?;
        }
        match &self.matcher {
            Matcher::Id(id) => write!(f, "#{}", id),
            Matcher::Tag(tag) => write!(f, "{}", tag),
            Matcher::Class(class) => write!(f, ".{}", class),
            Matcher::Attr { name, value } => write!(f, "[{}=\"{}\"]", name, value),
        }
    }
}

fn resolve_id(layout: &FormLayout, id: &str) -> Option<Element> {
    match id {
        SUBMIT_BUTTON => return Some(Element::SubmitButton),
        INPUT_ERROR_MESSAGE => return Some(Element::InputErrorMessage),
        PASSWORD_ERROR_MESSAGE => return Some(Element::PasswordErrorMessage),
        SUCCESS_MESSAGE => return Some(Element::SuccessMessage),
        COUNTRY if layout.location.is_some() => return Some(Element::Country),
        CITY if layout.location.is_some() => return Some(Element::City),
        _ => {}
    }
    if layout.field(id).is_some() {
        return Some(Element::Field(id.to_string()));
    }
    if layout.select(id).is_some() {
        return Some(Element::Select(id.to_string()));
    }
    None
}

fn resolve_attr(layout: &FormLayout, name: &str, value: &str) -> Option<Element> {
    match (name, value) {
        ("id", id) => return resolve_id(layout, id),
        ("type", "radio") => return Some(Element::Radios(None)),
        ("type", "checkbox") => return Some(Element::Checkboxes(None)),
        ("type", "submit") => return Some(Element::SubmitButton),
        ("name", group) => {
            if layout.radio_group(group).is_some() {
                return Some(Element::Radios(Some(group.to_string())));
            }
            if layout.checkbox_group(group).is_some() {
                return Some(Element::Checkboxes(Some(group.to_string())));
            }
        }
        _ => {}
    }

    layout
        .fields
        .iter()
        .find(|f| f.attributes.get(name).map(|v| v == value).unwrap_or(false))
        .map(|f| Element::Field(f.id.clone()))
}
