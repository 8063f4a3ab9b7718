use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, trace};

use crate::models::Contact;
use crate::tasks::{Completion, Outcome, PendingTask, Request, TaskRunner};

use super::forms::{ConfirmContactDelete, ContactField, ContactForm};
use super::helpers::{centered_rect, cursor_column, spinner_frame, visible_window};
use super::screens::{DetailScreen, ListScreen, SearchState};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the filter line above the contact cards.
const FILTER_HEIGHT: u16 = 3;
/// Height allocation per contact card.
const CONTACT_CARD_HEIGHT: u16 = 4;

/// Fine-grained modes layered over whichever screen is showing.
enum Mode {
    Normal,
    Searching(SearchState),
    ConfirmDelete(ConfirmContactDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
///
/// The list screen is always present underneath; the detail screen sits on
/// top of it while a contact is being created or edited. At most one
/// background task is outstanding at a time.
pub struct App {
    tasks: TaskRunner,
    list: ListScreen,
    detail: Option<DetailScreen>,
    mode: Mode,
    status: Option<StatusMessage>,
    pending: Option<PendingTask>,
    tick: usize,
}

impl App {
    /// Build the app and issue the initial search, since the list screen is
    /// visible from the start.
    pub fn new(tasks: TaskRunner) -> Self {
        let mut app = Self {
            tasks,
            list: ListScreen::default(),
            detail: None,
            mode: Mode::Normal,
            status: None,
            pending: None,
            tick: 0,
        };
        app.refresh_list();
        app
    }

    /// Process a key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Searching(state) => self.handle_search(code, state),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
        };

        exit
    }

    /// Ctrl+D on the detail screen asks to delete the contact being edited.
    pub(crate) fn handle_ctrl_d(&mut self) {
        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        let Some(detail) = &self.detail else {
            return;
        };
        if detail.loading {
            return;
        }

        let id = detail.id;
        let draft = detail.form.to_draft();
        match id {
            Some(id) => {
                self.clear_status();
                self.mode = Mode::ConfirmDelete(ConfirmContactDelete {
                    contact: Contact::from_draft(id, draft),
                });
            }
            None => self.set_status("This contact has not been saved yet.", StatusKind::Error),
        }
    }

    /// Advance the loading animation and apply finished tasks.
    pub(crate) fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.poll_tasks();
    }

    pub(crate) fn poll_tasks(&mut self) {
        while let Some(completion) = self.tasks.try_next() {
            self.apply_completion(completion);
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        if self.detail.is_some() {
            return self.handle_detail_key(code);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.list.move_selection(-1),
            KeyCode::Down => self.list.move_selection(1),
            KeyCode::PageUp => self.list.move_selection(-5),
            KeyCode::PageDown => self.list.move_selection(5),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(),
            KeyCode::Char('f') | KeyCode::Char('/') => {
                self.clear_status();
                return Mode::Searching(SearchState {
                    query: self.list.filter.clone(),
                });
            }
            KeyCode::Char('r') => self.refresh_list(),
            KeyCode::Char('+') | KeyCode::Char('n') => {
                self.clear_status();
                self.open_detail(None);
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = self.list.current_contact().map(|c| c.id) {
                    self.clear_status();
                    self.open_detail(Some(id));
                } else {
                    self.set_status("No contact selected.", StatusKind::Error);
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_detail_key(&mut self, code: KeyCode) -> Mode {
        if code == KeyCode::Esc {
            self.close_detail();
            return Mode::Normal;
        }

        let Some(detail) = self.detail.as_mut() else {
            return Mode::Normal;
        };
        if detail.loading {
            return Mode::Normal;
        }

        match code {
            KeyCode::Tab | KeyCode::BackTab => detail.form.toggle_field(),
            KeyCode::Backspace => detail.form.backspace(),
            KeyCode::Enter => self.save_detail(),
            KeyCode::Char(ch) => {
                detail.form.push_char(ch);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Enter => {
                self.search(state.query);
                return Mode::Normal;
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Up => self.list.move_selection(-1),
            KeyCode::Down => self.list.move_selection(1),
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => {}
        }
        Mode::Searching(state)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmContactDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.loading = true;
                }
                self.submit(Request::Delete {
                    id: confirm.contact.id,
                });
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    /// Run a new search with `filter` and remember it for later refreshes.
    fn search(&mut self, filter: String) {
        self.list.filter = filter;
        self.refresh_list();
    }

    fn refresh_list(&mut self) {
        self.list.loading = true;
        let filter = self.list.filter.clone();
        self.submit(Request::Search { filter });
    }

    fn open_detail(&mut self, id: Option<i64>) {
        self.list.loading = false;
        match id {
            Some(id) => {
                self.detail = Some(DetailScreen::edit(id));
                self.submit(Request::Load { id });
            }
            None => {
                self.cancel_pending();
                self.detail = Some(DetailScreen::create());
            }
        }
    }

    /// Leave the detail screen. Whatever it still had in flight is cancelled,
    /// and the list refreshes because it becomes visible again.
    fn close_detail(&mut self) {
        self.cancel_pending();
        self.detail = None;
        self.refresh_list();
    }

    fn save_detail(&mut self) {
        let Some(detail) = self.detail.as_mut() else {
            return;
        };

        let draft = detail.form.to_draft();
        let request = match detail.id {
            Some(id) => Request::Update(Contact::from_draft(id, draft)),
            None => Request::Insert(draft),
        };
        detail.loading = true;

        self.clear_status();
        self.submit(request);
    }

    /// Start `request`, replacing any task that is still outstanding.
    fn submit(&mut self, request: Request) {
        self.cancel_pending();
        self.pending = Some(self.tasks.submit(request));
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        let is_current = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ticket() == completion.ticket);
        if !is_current {
            trace!(ticket = ?completion.ticket, "ignoring stale completion");
            return;
        }
        self.pending = None;

        match completion.outcome {
            Outcome::Contacts(contacts) => {
                debug!(count = contacts.len(), "search finished");
                self.list.set_contacts(contacts);
                let notice = format!("Searching for \"{}\"", self.list.filter);
                self.set_status(notice, StatusKind::Info);
            }
            Outcome::Loaded(found) => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.loading = false;
                    match found {
                        Some(contact) => detail.form = ContactForm::from_contact(&contact),
                        None => debug!(id = ?detail.id, "contact to edit was not found"),
                    }
                }
            }
            Outcome::Inserted(_) | Outcome::Updated | Outcome::Deleted => self.close_detail(),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_list(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Some(detail) = &self.detail {
            self.draw_detail(frame, area, detail);
        }

        match &self.mode {
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(FILTER_HEIGHT), Constraint::Min(0)])
            .split(area);

        let filter_line = if self.list.filter.is_empty() {
            Line::from(vec![
                Span::raw("Filter: "),
                Span::styled("<none>", Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(format!("Filter: {}", self.list.filter))
        };
        let filter = Paragraph::new(filter_line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(filter, chunks[0]);

        let list_area = chunks[1];
        if list_area.height == 0 {
            return;
        }

        let title = if self.list.loading {
            format!("Contacts {} loading", spinner_frame(self.tick))
        } else {
            format!("Contacts ({})", self.list.contacts.len())
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.list.contacts.is_empty() {
            let message_text = if self.list.loading {
                ""
            } else if self.list.filter.is_empty() {
                "No contacts yet. Press '+' to add one."
            } else {
                "No contacts match the current search."
            };
            let message = Paragraph::new(message_text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, list_area);
            return;
        }

        frame.render_widget(block.clone(), list_area);
        self.render_contact_cards(frame, block.inner(list_area));
    }

    fn render_contact_cards(&self, frame: &mut Frame, area: Rect) {
        let contacts = &self.list.contacts;
        if contacts.is_empty() || area.height == 0 {
            return;
        }

        let capacity = (area.height / CONTACT_CARD_HEIGHT).max(1) as usize;
        let (start, end) = visible_window(self.list.selected, capacity, contacts.len());
        if end <= start {
            return;
        }

        let constraints: Vec<Constraint> = (start..end)
            .map(|_| Constraint::Length(CONTACT_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (chunk, index) in rows.iter().zip(start..end) {
            if chunk.height == 0 {
                continue;
            }

            let contact = &contacts[index];
            let selected = index == self.list.selected;
            let mut block = Block::default().borders(Borders::ALL);
            let mut paragraph_style = Style::default();
            if selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
            }

            let name = if selected {
                format!("> {}", contact.name)
            } else {
                contact.name.clone()
            };
            let phone = if contact.phone.trim().is_empty() {
                "No phone".to_string()
            } else {
                contact.phone.clone()
            };
            let lines = vec![
                Line::from(Span::styled(
                    name,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(phone, Style::default().fg(Color::Gray))),
            ];

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .style(paragraph_style);
            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect, detail: &DetailScreen) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(detail.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            detail.form.build_line("Name", ContactField::Name),
            detail.form.build_line("Phone", ContactField::Phone),
            Line::from(""),
        ];

        if detail.loading {
            lines.push(Line::from(Span::styled(
                format!("{} Working...", spinner_frame(self.tick)),
                Style::default().fg(Color::Cyan),
            )));
        } else {
            let hint = if detail.id.is_some() {
                "Enter to save • Tab to switch • Ctrl+D to delete • Esc to go back"
            } else {
                "Enter to save • Tab to switch • Esc to go back"
            };
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if detail.loading || !matches!(self.mode, Mode::Normal) {
            return;
        }

        let (prefix, row) = match detail.form.active {
            ContactField::Name => ("Name: ", 0),
            ContactField::Phone => ("Phone: ", 1),
        };
        let typed = detail.form.value_len(detail.form.active);
        let cursor_x = cursor_column(inner, prefix.len() + typed);
        frame.set_cursor_position((cursor_x, inner.y.saturating_add(row)));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmContactDelete) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let label = if confirm.contact.name.trim().is_empty() {
            "this contact".to_string()
        } else {
            format!("\"{}\"", confirm.contact)
        };
        let lines = vec![
            Line::from(format!("Delete {label}?")),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = cursor_column(inner, "Search: ".len() + state.query.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let keys: &[(&str, &str)] = match (&self.mode, &self.detail) {
            (Mode::Searching(_), _) => &[("[Enter]", "Search"), ("[Esc]", "Close")],
            (Mode::ConfirmDelete(_), _) => &[("[y]", "Delete"), ("[n]", "Keep")],
            (Mode::Normal, Some(detail)) if detail.loading => &[("[Esc]", "Cancel")],
            (Mode::Normal, Some(detail)) if detail.id.is_some() => &[
                ("[Enter]", "Save"),
                ("[Tab]", "Switch Field"),
                ("[Ctrl+D]", "Delete"),
                ("[Esc]", "Back"),
            ],
            (Mode::Normal, Some(_)) => &[
                ("[Enter]", "Save"),
                ("[Tab]", "Switch Field"),
                ("[Esc]", "Back"),
            ],
            (Mode::Normal, None) => &[
                ("[↑↓]", "Navigate"),
                ("[f]", "Search"),
                ("[+]", "New"),
                ("[Enter]", "Edit"),
                ("[r]", "Refresh"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (idx, (key, action)) in keys.iter().enumerate() {
            spans.push(Span::styled(*key, key_style));
            if idx + 1 == keys.len() {
                spans.push(Span::raw(format!(" {action}")));
            } else {
                spans.push(Span::raw(format!(" {action}   ")));
            }
        }
        Line::from(spans)
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::runtime::Runtime;

    use super::*;
    use crate::db::ContactStore;
    use crate::models::ContactDraft;

    struct Harness {
        app: App,
        store: Arc<ContactStore>,
        _runtime: Runtime,
    }

    fn harness_with_delay(delay: Duration, seed: &[(&str, &str)]) -> Harness {
        let runtime = Runtime::new().unwrap();
        let store = Arc::new(ContactStore::open_in_memory().unwrap());
        for (name, phone) in seed {
            store.insert(&ContactDraft::new(*name, *phone));
        }
        let tasks = TaskRunner::new(runtime.handle().clone(), Arc::clone(&store), delay);
        Harness {
            app: App::new(tasks),
            store,
            _runtime: runtime,
        }
    }

    fn harness(seed: &[(&str, &str)]) -> Harness {
        let mut harness = harness_with_delay(Duration::ZERO, seed);
        settle(&mut harness.app);
        harness
    }

    /// Poll until no task is outstanding.
    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.pending.is_some() {
            assert!(Instant::now() < deadline, "task did not finish in time");
            app.poll_tasks();
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn list_names(app: &App) -> Vec<String> {
        app.list.contacts.iter().map(|c| c.name.clone()).collect()
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn status_text(app: &App) -> Option<&str> {
        app.status.as_ref().map(|s| s.text.as_str())
    }

    #[test]
    fn startup_lists_existing_contacts() {
        let h = harness(&[("Ana", "111"), ("Bob", "222")]);
        assert_eq!(list_names(&h.app), vec!["Ana", "Bob"]);
        assert!(!h.app.list.loading);
    }

    #[test]
    fn every_finished_search_shows_the_notice() {
        let mut h = harness_with_delay(Duration::ZERO, &[("Ana", "111")]);
        assert!(h.app.status.is_none());
        settle(&mut h.app);
        assert_eq!(status_text(&h.app), Some("Searching for \"\""));

        h.app.handle_key(KeyCode::Char('f'));
        type_text(&mut h.app, "An");
        h.app.handle_key(KeyCode::Enter);
        assert!(h.app.status.is_none());
        settle(&mut h.app);
        assert_eq!(status_text(&h.app), Some("Searching for \"An\""));

        h.app.handle_key(KeyCode::Enter);
        settle(&mut h.app);
        h.app.handle_key(KeyCode::Esc);
        assert!(h.app.status.is_none());
        settle(&mut h.app);
        assert_eq!(status_text(&h.app), Some("Searching for \"An\""));
    }

    #[test]
    fn search_is_case_sensitive_and_sticky() {
        let mut h = harness(&[("Ana", "111"), ("Bob", "222")]);

        h.app.handle_key(KeyCode::Char('f'));
        type_text(&mut h.app, "ana");
        h.app.handle_key(KeyCode::Enter);
        settle(&mut h.app);
        assert!(list_names(&h.app).is_empty());
        assert_eq!(status_text(&h.app), Some("Searching for \"ana\""));

        h.app.handle_key(KeyCode::Char('/'));
        for _ in 0..3 {
            h.app.handle_key(KeyCode::Backspace);
        }
        type_text(&mut h.app, "Ana");
        h.app.handle_key(KeyCode::Enter);
        settle(&mut h.app);
        assert_eq!(list_names(&h.app), vec!["Ana"]);
        assert_eq!(h.app.list.filter, "Ana");
    }

    #[test]
    fn creating_a_contact_returns_to_the_list() {
        let mut h = harness(&[]);

        h.app.handle_key(KeyCode::Char('+'));
        assert!(h.app.detail.is_some());
        type_text(&mut h.app, "Carla");
        h.app.handle_key(KeyCode::Tab);
        type_text(&mut h.app, "333");
        h.app.handle_key(KeyCode::Enter);
        settle(&mut h.app);

        assert!(h.app.detail.is_none());
        settle(&mut h.app);
        assert_eq!(list_names(&h.app), vec!["Carla"]);
        assert_eq!(h.store.search("Carla", false)[0].phone, "333");
    }

    #[test]
    fn editing_loads_then_updates() {
        let mut h = harness(&[("Bob", "222")]);

        h.app.handle_key(KeyCode::Enter);
        settle(&mut h.app);
        let detail = h.app.detail.as_ref().unwrap();
        assert!(!detail.loading);
        assert_eq!(detail.form.name, "Bob");
        assert_eq!(detail.form.phone, "222");

        type_text(&mut h.app, "by");
        h.app.handle_key(KeyCode::Tab);
        for _ in 0..3 {
            h.app.handle_key(KeyCode::Backspace);
        }
        type_text(&mut h.app, "333");
        h.app.handle_key(KeyCode::Enter);
        settle(&mut h.app);
        settle(&mut h.app);

        assert!(h.app.detail.is_none());
        let stored = h.store.search("", false);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Bobby");
        assert_eq!(stored[0].phone, "333");
        assert_eq!(list_names(&h.app), vec!["Bobby"]);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut h = harness(&[("Ana", "111")]);

        h.app.handle_key(KeyCode::Enter);
        settle(&mut h.app);

        h.app.handle_ctrl_d();
        assert!(matches!(h.app.mode, Mode::ConfirmDelete(_)));
        h.app.handle_key(KeyCode::Char('n'));
        assert!(matches!(h.app.mode, Mode::Normal));
        assert_eq!(h.store.count(), 1);

        h.app.handle_ctrl_d();
        h.app.handle_key(KeyCode::Char('y'));
        settle(&mut h.app);
        settle(&mut h.app);

        assert!(h.app.detail.is_none());
        assert_eq!(h.store.count(), 0);
        assert!(list_names(&h.app).is_empty());
    }

    #[test]
    fn delete_is_unavailable_while_creating() {
        let mut h = harness(&[]);
        h.app.handle_key(KeyCode::Char('n'));
        h.app.handle_ctrl_d();
        assert!(matches!(h.app.mode, Mode::Normal));
    }

    #[test]
    fn leaving_during_a_slow_save_cancels_it() {
        let mut h = harness_with_delay(Duration::from_secs(30), &[]);

        h.app.handle_key(KeyCode::Char('+'));
        type_text(&mut h.app, "Ghost");
        h.app.handle_key(KeyCode::Enter);
        assert!(h.app.detail.as_ref().unwrap().loading);

        // Typing is ignored while the save is outstanding.
        type_text(&mut h.app, "xyz");
        assert_eq!(h.app.detail.as_ref().unwrap().form.name, "Ghost");

        h.app.handle_key(KeyCode::Esc);
        assert!(h.app.detail.is_none());
        thread::sleep(Duration::from_millis(50));
        h.app.poll_tasks();
        assert_eq!(h.store.count(), 0);
    }

    #[test]
    fn missing_contact_leaves_blank_form() {
        let mut h = harness(&[("Ana", "111")]);
        let id = h.app.list.current_contact().unwrap().id;
        h.store.delete(id);

        h.app.handle_key(KeyCode::Char('e'));
        settle(&mut h.app);
        let detail = h.app.detail.as_ref().unwrap();
        assert_eq!(detail.id, Some(id));
        assert!(!detail.loading);
        assert!(detail.form.name.is_empty());
    }

    #[test]
    fn enter_without_selection_sets_status() {
        let mut h = harness(&[]);
        h.app.handle_key(KeyCode::Enter);
        assert!(h.app.detail.is_none());
        assert_eq!(status_text(&h.app), Some("No contact selected."));
    }

    #[test]
    fn quit_keys_only_apply_on_the_list() {
        let mut h = harness(&[]);
        h.app.handle_key(KeyCode::Char('+'));
        assert!(!h.app.handle_key(KeyCode::Char('q')));
        h.app.handle_key(KeyCode::Esc);
        assert!(h.app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn draw_shows_contacts_and_detail() {
        let mut h = harness(&[("Ana", "111")]);
        let screen = render(&h.app);
        assert!(screen.contains("Ana"));
        assert!(screen.contains("111"));
        assert!(screen.contains("Contacts (1)"));

        h.app.handle_key(KeyCode::Char('+'));
        let screen = render(&h.app);
        assert!(screen.contains("New Contact"));
    }

    #[test]
    fn delete_prompt_names_the_contact() {
        let mut h = harness(&[("Ana", "111")]);
        h.app.handle_key(KeyCode::Enter);
        settle(&mut h.app);
        h.app.handle_ctrl_d();

        let screen = render(&h.app);
        assert!(screen.contains("Delete \"Ana (111)\"?"));
    }

    #[test]
    fn oversized_field_keeps_cursor_on_screen() {
        let mut h = harness(&[]);
        h.app.handle_key(KeyCode::Char('+'));
        h.app.detail.as_mut().unwrap().form.name = "x".repeat(70_000);

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| h.app.draw(frame)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < 80);
        assert!(cursor.y < 30);

        h.app.handle_key(KeyCode::Esc);
        h.app.handle_key(KeyCode::Char('f'));
        type_text(&mut h.app, &"y".repeat(200));
        terminal.draw(|frame| h.app.draw(frame)).unwrap();
        assert!(terminal.get_cursor_position().unwrap().x < 80);
    }
}
