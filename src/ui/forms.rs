use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Contact, ContactDraft};

/// Editable copy of a contact shown on the detail screen. It is thrown away
/// once the contact is saved or the screen is left.
#[derive(Default, Clone)]
pub(crate) struct ContactForm {
    pub(crate) name: String,
    pub(crate) phone: String,
    pub(crate) active: ContactField,
}

/// Fields available within the contact form.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum ContactField {
    #[default]
    Name,
    Phone,
}

impl ContactForm {
    /// Populate the form from a stored contact when editing.
    pub(crate) fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            phone: contact.phone.clone(),
            active: ContactField::Name,
        }
    }

    /// Swap focus between name and phone.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            ContactField::Name => ContactField::Phone,
            ContactField::Phone => ContactField::Name,
        };
    }

    /// Append a character to the active field. Control characters are
    /// rejected; anything else is allowed in either field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            ContactField::Name => self.name.push(ch),
            ContactField::Phone => self.phone.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            ContactField::Name => {
                self.name.pop();
            }
            ContactField::Phone => {
                self.phone.pop();
            }
        }
    }

    /// Values ready for the store. Nothing is required; blanks are saved as
    /// typed.
    pub(crate) fn to_draft(&self) -> ContactDraft {
        ContactDraft::new(self.name.clone(), self.phone.clone())
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: ContactField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<empty>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Character count of the requested field, for cursor placement.
    pub(crate) fn value_len(&self, field: ContactField) -> usize {
        self.value(field).chars().count()
    }

    fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Phone => &self.phone,
        }
    }
}

/// State for confirming a contact deletion.
#[derive(Clone)]
pub(crate) struct ConfirmContactDelete {
    /// Values shown in the prompt; only the id is used for the delete.
    pub(crate) contact: Contact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_goes_to_active_field() {
        let mut form = ContactForm::default();
        assert!(form.push_char('A'));
        form.toggle_field();
        assert!(form.push_char('1'));
        assert!(!form.push_char('\n'));

        assert_eq!(form.name, "A");
        assert_eq!(form.phone, "1");
        assert_eq!(form.active, ContactField::Phone);
    }

    #[test]
    fn backspace_only_touches_active_field() {
        let mut form = ContactForm::from_contact(&Contact {
            id: 3,
            name: "Ana".to_string(),
            phone: "111".to_string(),
        });
        form.backspace();
        assert_eq!(form.name, "An");
        assert_eq!(form.phone, "111");

        form.toggle_field();
        form.backspace();
        assert_eq!(form.phone, "11");
    }

    #[test]
    fn draft_keeps_blanks() {
        let form = ContactForm::default();
        assert_eq!(form.to_draft(), ContactDraft::default());
    }

    #[test]
    fn value_len_counts_chars() {
        let mut form = ContactForm::default();
        for ch in "Zoë".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.value_len(ContactField::Name), 3);
        assert_eq!(form.value_len(ContactField::Phone), 0);
    }

    #[test]
    fn build_line_shows_placeholder_for_empty_values() {
        let form = ContactForm::default();
        let line = form.build_line("Phone", ContactField::Phone);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "Phone: <empty>");
    }
}
