use std::error::Error as StdError;
use std::fmt;

use crate::core::ids::new_avatar_url;
use crate::core::persona::{PersonaCategory, PersonaDraft};
use crate::utils::input::{sanitize_single_line, sanitize_text_input};

/// Editable fields of the creation form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Category,
    Description,
    Instruction,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Category,
        FormField::Description,
        FormField::Instruction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Category => "Category",
            FormField::Description => "Short Description",
            FormField::Instruction => "System Instruction",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Required fields that were left blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub missing: Vec<FormField>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.missing.iter().map(|field| field.label()).collect();
        write!(f, "Required: {}", names.join(", "))
    }
}

impl StdError for ValidationError {}

/// State of the persona creation form.
#[derive(Debug, Clone)]
pub struct CreationForm {
    pub name: String,
    pub description: String,
    pub category: PersonaCategory,
    pub system_instruction: String,
    pub avatar_url: String,
    focus: FormField,
    error: Option<ValidationError>,
}

impl Default for CreationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CreationForm {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: PersonaCategory::default(),
            system_instruction: String::new(),
            avatar_url: new_avatar_url(),
            focus: FormField::Name,
            error: None,
        }
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub fn focus_next(&mut self) {
        let next = (self.focus.position() + 1) % FormField::ALL.len();
        self.focus = FormField::ALL[next];
    }

    pub fn focus_previous(&mut self) {
        let len = FormField::ALL.len();
        let prev = (self.focus.position() + len - 1) % len;
        self.focus = FormField::ALL[prev];
    }

    pub fn cycle_category(&mut self, forward: bool) {
        self.category = if forward {
            self.category.next()
        } else {
            self.category.previous()
        };
    }

    pub fn randomize_avatar(&mut self) {
        self.avatar_url = new_avatar_url();
    }

    /// Text of a free-text field; `None` for the category selector.
    pub fn field_text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Name => Some(&self.name),
            FormField::Description => Some(&self.description),
            FormField::Instruction => Some(&self.system_instruction),
            FormField::Category => None,
        }
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::Instruction => Some(&mut self.system_instruction),
            FormField::Category => None,
        }
    }

    /// Insert typed or pasted text into the focused field. Only the system
    /// instruction keeps line breaks.
    pub fn insert_text(&mut self, text: &str) {
        let multiline = self.focus == FormField::Instruction;
        let cleaned = if multiline {
            sanitize_text_input(text)
        } else {
            sanitize_single_line(text)
        };
        if let Some(value) = self.focused_text_mut() {
            value.push_str(&cleaned);
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_text(ch.encode_utf8(&mut buf));
    }

    pub fn backspace(&mut self) {
        if let Some(value) = self.focused_text_mut() {
            value.pop();
        }
    }

    /// Check required fields and build a draft without touching the form.
    pub fn validate(&self) -> Result<PersonaDraft, ValidationError> {
        let name = self.name.trim();
        let description = self.description.trim();
        let instruction = self.system_instruction.trim();

        let missing: Vec<FormField> = [
            (FormField::Name, name),
            (FormField::Description, description),
            (FormField::Instruction, instruction),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        Ok(PersonaDraft {
            name: name.to_string(),
            description: description.to_string(),
            category: self.category,
            system_instruction: instruction.to_string(),
            avatar_url: self.avatar_url.clone(),
        })
    }

    /// Validate and, on success, hand back the draft and reset the form.
    /// On failure the error is kept for display and the input stays put.
    pub fn submit(&mut self) -> Result<PersonaDraft, ValidationError> {
        match self.validate() {
            Ok(draft) => {
                self.reset();
                Ok(draft)
            }
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
