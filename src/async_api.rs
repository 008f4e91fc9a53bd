use crate::{ComposedDocument, Error, RenderConfig, Renderer, Result, Screenshot};
use log::{debug, error};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;

struct Job {
    document: ComposedDocument,
    resp: oneshot::Sender<Result<Screenshot>>,
}

/// An async front for a synchronous [`Renderer`], backed by worker threads.
///
/// The pool owns `workers` threads that pull jobs from a bounded queue, so at
/// most `workers` rendering sessions exist at once. Callers are rejected with
/// [`Error::Busy`] once `queue_depth` jobs are already waiting, and with
/// [`Error::Timeout`] when a render round trip outlives the deadline.
#[derive(Clone)]
pub struct RenderPool {
    job_tx: SyncSender<Job>,
    timeout: Duration,
}

impl RenderPool {
    /// Spawn the worker threads. They exit once every handle is dropped.
    pub fn new<R: Renderer>(renderer: R, config: &RenderConfig) -> Result<Self> {
        let renderer = Arc::new(renderer);
        let (job_tx, job_rx) = mpsc::sync_channel::<Job>(config.queue_depth);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let workers = config.workers.max(1);
        for i in 0..workers {
            let renderer = renderer.clone();
            let job_rx = job_rx.clone();
            thread::Builder::new()
                .name(format!("render-worker-{}", i))
                .spawn(move || worker_loop(renderer.as_ref(), &job_rx))
                .map_err(|e| Error::InitializationError(format!("Failed to spawn render worker: {}", e)))?;
        }
        debug!(
            "Render pool started: {} workers, queue depth {}, timeout {}ms",
            workers, config.queue_depth, config.timeout_ms
        );

        Ok(Self {
            job_tx,
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    /// Render a document, waiting at most the configured deadline.
    pub async fn capture(&self, document: ComposedDocument) -> Result<Screenshot> {
        let (tx, rx) = oneshot::channel();
        match self.job_tx.try_send(Job { document, resp: tx }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => return Err(Error::Busy),
            Err(TrySendError::Disconnected(_)) => {
                return Err(Error::RenderFailure("Render workers have shut down".into()))
            }
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(res) => res.map_err(|e| Error::RenderFailure(format!("Render canceled: {}", e)))?,
            Err(_) => Err(Error::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

fn worker_loop<R: Renderer + ?Sized>(renderer: &R, job_rx: &Mutex<Receiver<Job>>) {
    loop {
        // Only hold the lock while waiting for the next job.
        let next = match job_rx.lock() {
            Ok(rx) => rx.recv(),
            Err(poisoned) => poisoned.into_inner().recv(),
        };
        let Ok(job) = next else {
            break;
        };

        if job.resp.is_closed() {
            debug!("Skipping render abandoned while queued");
            continue;
        }

        let res = panic::catch_unwind(AssertUnwindSafe(|| renderer.capture(&job.document)))
            .unwrap_or_else(|_| {
                error!("Renderer panicked");
                Err(Error::RenderFailure("Renderer panicked".into()))
            });
        let _ = job.resp.send(res);
    }
    debug!("Render worker exiting");
}
