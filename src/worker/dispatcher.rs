use crate::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy)]
pub struct DispatcherSettings {
    pub request_timeout: Duration,
    pub max_pending_requests: usize,
    pub lint: LintOptions,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(5000),
            max_pending_requests: 64,
            lint: LintOptions::default(),
        }
    }
}

impl From<&Config> for DispatcherSettings {
    fn from(config: &Config) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            max_pending_requests: config.max_pending_requests,
            lint: LintOptions::from(config),
        }
    }
}

struct Running {
    requests: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
    router: JoinHandle<()>,
}

/// Runs analysis on one long-lived blocking worker and correlates the
/// responses with their callers.
///
/// Requests and responses cross the worker boundary as JSON strings. The
/// dispatcher owns the worker: [`init`](Self::init) starts it,
/// [`dispose`](Self::dispose) stops it, and independent dispatchers never
/// share one.
pub struct Dispatcher {
    settings: DispatcherSettings,
    pending: Arc<PendingTable>,
    running: Mutex<Option<Running>>,
    next_id: AtomicU64,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Self {
        Self::with_settings(DispatcherSettings::from(config))
    }

    pub fn with_settings(settings: DispatcherSettings) -> Self {
        Self {
            pending: Arc::new(PendingTable::new(settings.max_pending_requests)),
            settings,
            running: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    fn running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.running().is_some()
    }

    /// Start the worker and the response router. Calling it again while
    /// running is a no-op. Must be called from within a tokio runtime.
    pub fn init(&self) -> Result {
        let mut running = self.running();
        if running.is_some() {
            return Ok(());
        }
        let handle = Handle::try_current().map_err(|e| Error::Internal(e.to_string()))?;

        let (requests, mut inbox) = mpsc::unbounded_channel::<String>();
        let (outbox, responses) = mpsc::unbounded_channel::<String>();
        let analyzer = Analyzer::new(self.settings.lint);
        let worker = handle.spawn_blocking(move || {
            debug!("Analysis worker started");
            while let Some(message) = inbox.blocking_recv() {
                match analyzer.handle(&message) {
                    Ok(response) => {
                        if outbox.send(response).is_err() {
                            break;
                        }
                    }
                    Err(e) => error!("Analysis worker dropped a malformed request: {e}"),
                }
            }
            debug!("Analysis worker stopped");
        });
        let router = handle.spawn(route(responses, Arc::clone(&self.pending)));

        *running = Some(Running {
            requests,
            worker,
            router,
        });
        Ok(())
    }

    /// Stop the worker. Requests still pending fail with
    /// [`Error::WorkerNotRunning`]; a later [`init`](Self::init) starts a
    /// fresh worker.
    pub async fn dispose(&self) {
        let running = self.running().take();
        let Some(Running {
            requests,
            worker,
            router,
        }) = running
        else {
            return;
        };
        drop(requests);
        self.pending.fail_all(|_| Error::WorkerNotRunning);
        if let Err(e) = worker.await {
            warn!("Analysis worker ended abnormally: {e}");
        }
        if let Err(e) = router.await {
            warn!("Response router ended abnormally: {e}");
        }
    }

    /// Post a request and return a handle on its result.
    pub fn submit(
        &self,
        code: impl Into<String>,
        mode: AnalysisMode,
        language: impl Into<String>,
    ) -> Result<PendingAnalysis> {
        let requests = self
            .running()
            .as_ref()
            .map(|r| r.requests.clone())
            .ok_or(Error::WorkerNotRunning)?;

        let id = format!("analysis-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let message = serde_json::to_string(&WorkerRequest {
            id: id.clone(),
            request: AnalysisRequest::new(mode, code, language),
        })?;
        let receiver = self.pending.register(id.clone());
        let pending = PendingAnalysis::new(
            id,
            receiver,
            Arc::clone(&self.pending),
            self.settings.request_timeout,
        );
        requests
            .send(message)
            .map_err(|_| Error::WorkerNotRunning)?;
        trace!("Submitted {} ({mode})", pending.id());
        Ok(pending)
    }

    pub async fn analyze_code(
        &self,
        code: impl Into<String>,
        mode: AnalysisMode,
        language: impl Into<String>,
    ) -> Result<CodeAnalysisResult> {
        self.submit(code, mode, language)?.wait().await
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }
}

/// Deliver each worker response to its waiter; responses nobody waits for
/// any more are dropped.
async fn route(mut responses: mpsc::UnboundedReceiver<String>, pending: Arc<PendingTable>) {
    while let Some(message) = responses.recv().await {
        let response: WorkerResponse = match serde_json::from_str(&message) {
            Ok(response) => response,
            Err(e) => {
                error!("Undecodable worker response: {e}");
                continue;
            }
        };
        if !pending.resolve(&response.id, response.code_analysis) {
            trace!("Ignoring response for unknown request {}", response.id);
        }
    }
}
