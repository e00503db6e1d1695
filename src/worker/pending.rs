use crate::*;
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

type Waiter = oneshot::Sender<Result<CodeAnalysisResult>>;

/// Requests awaiting a worker response, oldest first.
///
/// The table never holds more than `capacity` entries: registering a request
/// into a full table evicts the oldest one, whose waiter then observes
/// [`Error::Cancelled`].
#[derive(Debug)]
pub struct PendingTable {
    waiters: Mutex<IndexMap<RequestId, Waiter>>,
    capacity: usize,
}

impl PendingTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            waiters: Mutex::new(IndexMap::new()),
            capacity: capacity.max(1),
        }
    }

    // Poisoning is ignored: every critical section leaves the map consistent.
    fn lock(&self) -> MutexGuard<'_, IndexMap<RequestId, Waiter>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Register a waiter for `id`, evicting the oldest entries over capacity.
    pub fn register(&self, id: RequestId) -> oneshot::Receiver<Result<CodeAnalysisResult>> {
        let (sender, receiver) = oneshot::channel();
        let evicted: Vec<(RequestId, Waiter)> = {
            let mut waiters = self.lock();
            let mut evicted = Vec::new();
            while waiters.len() >= self.capacity {
                match waiters.shift_remove_index(0) {
                    Some(entry) => evicted.push(entry),
                    None => break,
                }
            }
            waiters.insert(id, sender);
            evicted
        };
        for (id, waiter) in evicted {
            debug!("Evicting pending analysis {id}");
            let _ = waiter.send(Err(Error::Cancelled(id)));
        }
        receiver
    }

    /// Deliver a result to the waiter of `id`. Returns false for unknown ids.
    pub fn resolve(&self, id: &str, result: CodeAnalysisResult) -> bool {
        let Some(waiter) = self.lock().shift_remove(id) else {
            return false;
        };
        if waiter.send(Ok(result)).is_err() {
            trace!("Waiter for {id} went away before its result arrived");
        }
        true
    }

    pub fn remove(&self, id: &str) -> bool {
        self.lock().shift_remove(id).is_some()
    }

    /// Fail every waiter with the error `make` builds for its id.
    pub fn fail_all(&self, make: impl Fn(&str) -> Error) {
        let drained: Vec<_> = self.lock().drain(..).collect();
        for (id, waiter) in drained {
            let _ = waiter.send(Err(make(&id)));
        }
    }
}

/// Handle on one submitted analysis.
///
/// Dropping the handle (after [`wait`](Self::wait) returns, on
/// [`cancel`](Self::cancel), or on a plain drop) removes its table entry; a
/// response that arrives later is ignored.
#[derive(Debug)]
pub struct PendingAnalysis {
    id: RequestId,
    receiver: oneshot::Receiver<Result<CodeAnalysisResult>>,
    table: Arc<PendingTable>,
    timeout: Duration,
}

impl PendingAnalysis {
    pub(crate) fn new(
        id: RequestId,
        receiver: oneshot::Receiver<Result<CodeAnalysisResult>>,
        table: Arc<PendingTable>,
        timeout: Duration,
    ) -> Self {
        Self {
            id,
            receiver,
            table,
            timeout,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn wait(mut self) -> Result<CodeAnalysisResult> {
        match tokio::time::timeout(self.timeout, &mut self.receiver).await {
            Ok(Ok(result)) => result,
            // Sender dropped without a message: the worker went away.
            Ok(Err(_)) => Err(Error::Cancelled(self.id.clone())),
            Err(_) => {
                warn!("Analysis {} timed out after {:?}", self.id, self.timeout);
                Err(Error::Timeout(self.id.clone()))
            }
        }
    }

    /// Stop waiting. The worker still finishes the request.
    pub fn cancel(self) {
        trace!("Cancelling analysis {}", self.id);
    }
}

impl Drop for PendingAnalysis {
    fn drop(&mut self) {
        self.table.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(table: &Arc<PendingTable>, id: &str, timeout: Duration) -> PendingAnalysis {
        PendingAnalysis::new(
            id.to_string(),
            table.register(id.to_string()),
            Arc::clone(table),
            timeout,
        )
    }

    #[tokio::test]
    async fn resolves_by_id_in_any_order() {
        let table = Arc::new(PendingTable::new(8));
        let first = pending(&table, "1", Duration::from_secs(5));
        let second = pending(&table, "2", Duration::from_secs(5));

        let mut lineage = LineageMap::default();
        lineage.ctes.push(CteDefinition {
            name: "second".into(),
            statement_index: 0,
            span: Default::default(),
        });
        assert!(table.resolve(
            "2",
            CodeAnalysisResult {
                lineage,
                ..Default::default()
            }
        ));
        assert!(table.resolve("1", CodeAnalysisResult::default()));
        assert!(!table.resolve("3", CodeAnalysisResult::default()));

        assert!(first.wait().await.expect("first").lineage.ctes.is_empty());
        assert_eq!(second.wait().await.expect("second").lineage.ctes.len(), 1);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn full_table_evicts_oldest() {
        let table = Arc::new(PendingTable::new(2));
        let oldest = pending(&table, "1", Duration::from_secs(5));
        let _middle = pending(&table, "2", Duration::from_secs(5));
        let _newest = pending(&table, "3", Duration::from_secs(5));

        assert_eq!(table.len(), 2);
        assert!(!table.contains("1"));
        assert!(matches!(oldest.wait().await, Err(Error::Cancelled(id)) if id == "1"));
    }

    #[tokio::test]
    async fn timeout_removes_entry() {
        let table = Arc::new(PendingTable::new(2));
        let slow = pending(&table, "slow", Duration::from_millis(20));
        assert!(matches!(slow.wait().await, Err(Error::Timeout(id)) if id == "slow"));
        assert!(table.is_empty());
        // A late response is ignored.
        assert!(!table.resolve("slow", CodeAnalysisResult::default()));
    }

    #[tokio::test]
    async fn cancel_and_drop_remove_entries() {
        let table = Arc::new(PendingTable::new(4));
        let cancelled = pending(&table, "a", Duration::from_secs(5));
        let dropped = pending(&table, "b", Duration::from_secs(5));
        assert_eq!(table.len(), 2);
        cancelled.cancel();
        drop(dropped);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn fail_all_drains() {
        let table = Arc::new(PendingTable::new(4));
        let waiting = pending(&table, "a", Duration::from_secs(5));
        table.fail_all(|_| Error::WorkerNotRunning);
        assert!(table.is_empty());
        assert!(matches!(waiting.wait().await, Err(Error::WorkerNotRunning)));
    }
}
