use crate::models::Contact;

use super::forms::ContactForm;

/// State of the list/search screen. `contacts` always holds the last search
/// result in store order.
#[derive(Default)]
pub(crate) struct ListScreen {
    pub(crate) contacts: Vec<Contact>,
    /// Filter used for the last submitted search.
    pub(crate) filter: String,
    pub(crate) selected: usize,
    pub(crate) loading: bool,
}

impl ListScreen {
    /// Replace the displayed collection, keeping the selection on the same
    /// contact when it is still present.
    pub(crate) fn set_contacts(&mut self, contacts: Vec<Contact>) {
        let focused = self.current_contact().map(|c| c.id);
        self.contacts = contacts;
        self.loading = false;

        if let Some(id) = focused {
            if let Some(idx) = self.contacts.iter().position(|c| c.id == id) {
                self.selected = idx;
                return;
            }
        }
        self.ensure_in_bounds();
    }

    pub(crate) fn current_contact(&self) -> Option<&Contact> {
        self.contacts.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.contacts.is_empty() {
            return;
        }
        let len = self.contacts.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.contacts.len().saturating_sub(1);
    }

    pub(crate) fn ensure_in_bounds(&mut self) {
        if self.contacts.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.contacts.len() {
            self.selected = self.contacts.len() - 1;
        }
    }
}

/// State of the detail screen. `id` is `None` while creating.
pub(crate) struct DetailScreen {
    pub(crate) id: Option<i64>,
    pub(crate) form: ContactForm,
    pub(crate) loading: bool,
}

impl DetailScreen {
    pub(crate) fn create() -> Self {
        Self {
            id: None,
            form: ContactForm::default(),
            loading: false,
        }
    }

    /// Edit an existing contact; the form fills in once the lookup lands.
    pub(crate) fn edit(id: i64) -> Self {
        Self {
            id: Some(id),
            form: ContactForm::default(),
            loading: true,
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        if self.id.is_some() {
            "Edit Contact"
        } else {
            "New Contact"
        }
    }
}

/// Text typed into the search bar before it is submitted.
pub(crate) struct SearchState {
    pub(crate) query: String,
}
