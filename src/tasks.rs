//! Background execution of store calls.
//!
//! Every user action becomes one task on the tokio runtime: an optional
//! cosmetic pause, exactly one store call on the blocking pool, then a
//! [`Completion`] posted back to the UI thread. Tasks can be cancelled; a
//! cancelled task never posts.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tracing::{debug, trace, warn};

use crate::db::ContactStore;
use crate::models::{Contact, ContactDraft};

/// Identifies one submitted task so the UI can drop stale completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// One store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Name substring search for the list screen.
    Search { filter: String },
    /// Id lookup for the detail screen.
    Load { id: i64 },
    Insert(ContactDraft),
    Update(Contact),
    Delete { id: i64 },
}

/// What a finished [`Request`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Contacts(Vec<Contact>),
    Loaded(Option<Contact>),
    Inserted(Option<i64>),
    Updated,
    Deleted,
}

impl Request {
    /// Run the request synchronously against `store`.
    pub fn execute(self, store: &ContactStore) -> Outcome {
        match self {
            Request::Search { filter } => Outcome::Contacts(store.search(&filter, false)),
            Request::Load { id } => {
                Outcome::Loaded(store.search(&id.to_string(), true).into_iter().next())
            }
            Request::Insert(draft) => Outcome::Inserted(store.insert(&draft)),
            Request::Update(contact) => {
                store.update(&contact);
                Outcome::Updated
            }
            Request::Delete { id } => {
                store.delete(id);
                Outcome::Deleted
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Request::Search { .. } => "search",
            Request::Load { .. } => "load",
            Request::Insert(_) => "insert",
            Request::Update(_) => "update",
            Request::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Outcome,
}

/// Handle to a submitted task. Dropping it leaves the task running.
#[derive(Debug)]
pub struct PendingTask {
    ticket: Ticket,
    abort: AbortHandle,
}

impl PendingTask {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Stop the task. If it is still in its pause, the store is never
    /// touched; either way no completion is posted.
    pub fn cancel(self) {
        trace!(ticket = self.ticket.0, "cancelling task");
        self.abort.abort();
    }
}

#[derive(Debug)]
pub struct TaskRunner {
    runtime: Handle,
    store: Arc<ContactStore>,
    delay: Duration,
    next_ticket: u64,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl TaskRunner {
    pub fn new(runtime: Handle, store: Arc<ContactStore>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            store,
            delay,
            next_ticket: 0,
            tx,
            rx,
        }
    }

    pub fn submit(&mut self, request: Request) -> PendingTask {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        let delay = self.delay;

        debug!(ticket = ticket.0, kind = request.label(), "submitting task");
        let handle = self.runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let outcome =
                match tokio::task::spawn_blocking(move || request.execute(&store)).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        warn!(ticket = ticket.0, %err, "store call did not finish");
                        return;
                    }
                };

            // The receiver only goes away when the runner does.
            let _ = tx.send(Completion { ticket, outcome });
        });

        PendingTask {
            ticket,
            abort: handle.abort_handle(),
        }
    }

    /// Next finished task, if any, without waiting.
    pub fn try_next(&mut self) -> Option<Completion> {
        match self.rx.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait for the next finished task.
    pub async fn next(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_runner(delay: Duration) -> (TaskRunner, Arc<ContactStore>) {
        let store = Arc::new(ContactStore::open_in_memory().unwrap());
        let runner = TaskRunner::new(Handle::current(), Arc::clone(&store), delay);
        (runner, store)
    }

    #[test]
    fn execute_maps_each_request() {
        let store = ContactStore::open_in_memory().unwrap();

        let Outcome::Inserted(Some(id)) =
            Request::Insert(ContactDraft::new("Ana", "111")).execute(&store)
        else {
            panic!("insert should return an id");
        };

        let loaded = Request::Load { id }.execute(&store);
        assert_eq!(
            loaded,
            Outcome::Loaded(Some(Contact {
                id,
                name: "Ana".to_string(),
                phone: "111".to_string(),
            }))
        );

        let updated = Request::Update(Contact {
            id,
            name: "Ana Maria".to_string(),
            phone: "111".to_string(),
        })
        .execute(&store);
        assert_eq!(updated, Outcome::Updated);

        let Outcome::Contacts(found) = Request::Search {
            filter: "Maria".to_string(),
        }
        .execute(&store) else {
            panic!("search should return contacts");
        };
        assert_eq!(found.len(), 1);

        assert_eq!(Request::Delete { id }.execute(&store), Outcome::Deleted);
        assert_eq!(Request::Load { id }.execute(&store), Outcome::Loaded(None));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn submitted_task_posts_completion() {
        let (mut runner, store) = create_runner(Duration::ZERO);
        store.insert(&ContactDraft::new("Ana", "111"));

        let pending = runner.submit(Request::Search {
            filter: String::new(),
        });
        let completion = runner.next().await.unwrap();

        assert_eq!(completion.ticket, pending.ticket());
        let Outcome::Contacts(contacts) = completion.outcome else {
            panic!("expected contacts");
        };
        assert_eq!(contacts.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tickets_are_unique() {
        let (mut runner, _store) = create_runner(Duration::ZERO);
        let first = runner.submit(Request::Delete { id: 1 });
        let second = runner.submit(Request::Delete { id: 2 });
        assert_ne!(first.ticket(), second.ticket());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancelled_task_never_touches_store() {
        let (mut runner, store) = create_runner(Duration::from_secs(30));

        let pending = runner.submit(Request::Insert(ContactDraft::new("Ana", "111")));
        pending.cancel();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(runner.try_next().is_none());
        assert_eq!(store.count(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn later_task_completes_after_cancel() {
        let store = Arc::new(ContactStore::open_in_memory().unwrap());
        let mut slow = TaskRunner::new(
            Handle::current(),
            Arc::clone(&store),
            Duration::from_secs(30),
        );
        let cancelled = slow.submit(Request::Search {
            filter: String::new(),
        });
        cancelled.cancel();

        let mut fast = TaskRunner::new(Handle::current(), Arc::clone(&store), Duration::ZERO);
        let pending = fast.submit(Request::Insert(ContactDraft::new("Bob", "222")));
        let completion = fast.next().await.unwrap();

        assert_eq!(completion.ticket, pending.ticket());
        assert!(matches!(completion.outcome, Outcome::Inserted(Some(_))));
        assert!(slow.try_next().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn try_next_is_empty_before_anything_runs() {
        let (mut runner, _store) = create_runner(Duration::from_secs(30));
        assert!(runner.try_next().is_none());
    }
}
