use crate::matching::UrlPattern;
use crate::types::NetworkTransaction;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Number of transactions kept before the oldest is evicted.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

type Entries = Arc<Vec<NetworkTransaction>>;

/// Ordered, bounded log of transactions, oldest first.
///
/// Writers are serialized by the channel's lock and publish a fresh snapshot;
/// snapshots already handed out are never mutated.
pub struct TransactionLog {
    sender: watch::Sender<Entries>,
    capacity: usize,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            sender,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a transaction, evicting the oldest entries past capacity.
    pub fn record(&self, transaction: NetworkTransaction) {
        let capacity = self.capacity;
        self.sender.send_modify(|entries| {
            let entries = Arc::make_mut(entries);
            entries.push(transaction);
            if entries.len() > capacity {
                let excess = entries.len() - capacity;
                entries.drain(..excess);
            }
        });
    }

    /// Replace the entry with `id` by `transform(entry)`.
    ///
    /// Returns `false` without publishing when no entry has that id, which
    /// happens when the log was cleared while the call was in flight.
    pub fn update(
        &self,
        id: &str,
        transform: impl FnOnce(NetworkTransaction) -> NetworkTransaction,
    ) -> bool {
        let updated = self.sender.send_if_modified(|entries| {
            let Some(index) = entries.iter().position(|t| t.id == id) else {
                return false;
            };
            let entry = &mut Arc::make_mut(entries)[index];
            *entry = transform(entry.clone());
            true
        });
        if !updated {
            tracing::debug!(transaction_id = id, "transaction no longer in log");
        }
        updated
    }

    pub fn clear(&self) {
        self.sender.send_modify(|entries| *entries = Arc::new(Vec::new()));
    }

    /// Current entries, oldest first.
    pub fn snapshot(&self) -> Entries {
        Arc::clone(&self.sender.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Entries> {
        self.sender.subscribe()
    }

    pub fn len(&self) -> usize {
        self.sender.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.borrow().is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<NetworkTransaction> {
        self.sender.borrow().iter().find(|t| t.id == id).cloned()
    }

    /// Entries whose request URL matches `pattern` ignoring case.
    ///
    /// A blank pattern returns everything; an invalid regex matches as a substring.
    pub fn filter_by_pattern(&self, pattern: &str) -> Vec<NetworkTransaction> {
        let entries = self.snapshot();
        if pattern.trim().is_empty() {
            return entries.to_vec();
        }
        let pattern = UrlPattern::compile_ignore_case(pattern);
        entries
            .iter()
            .filter(|t| pattern.is_match(&t.request.url))
            .cloned()
            .collect()
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransactionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionLog")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
