use crate::error::{Error, Result};
use futures_util::future::BoxFuture;
use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{Semaphore, mpsc};
use tracing::{error, warn};

/// A unit of work for the main lane.
pub type MainTask = Box<dyn FnOnce() + Send + 'static>;

/// Two execution lanes: a concurrent background lane for network work and a
/// serial main lane where completion callbacks run.
pub trait ThreadScheduler: Send + Sync + fmt::Debug {
    /// Runs `task` on the background lane.
    fn run_on_background(&self, task: BoxFuture<'static, ()>);

    /// Runs `task` on the main lane. Tasks run one at a time, in submission
    /// order.
    fn run_on_main(&self, task: MainTask);
}

/// [`ThreadScheduler`] on a Tokio runtime.
///
/// Background tasks are spawned onto the runtime with at most
/// `max_concurrent` executing at once. Main-lane tasks are drained by a
/// single dispatcher task; a panicking callback is logged and the lane keeps
/// running.
#[derive(Clone)]
pub struct TokioScheduler {
    handle: Handle,
    permits: Arc<Semaphore>,
    main_tx: mpsc::UnboundedSender<MainTask>,
}

impl fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("available_permits", &self.permits.available_permits())
            .field("main_lane_open", &!self.main_tx.is_closed())
            .finish()
    }
}

impl TokioScheduler {
    /// Creates a scheduler on the current runtime.
    ///
    /// # Errors
    ///
    /// Fails when called outside a Tokio runtime.
    pub fn new(max_concurrent: usize) -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| {
            Error::invalid_argument(format!("TokioScheduler requires a Tokio runtime: {e}"))
        })?;
        Ok(Self::with_handle(handle, max_concurrent))
    }

    /// Creates a scheduler on the given runtime.
    pub fn with_handle(handle: Handle, max_concurrent: usize) -> Self {
        let (main_tx, mut main_rx) = mpsc::unbounded_channel::<MainTask>();

        handle.spawn(async move {
            while let Some(task) = main_rx.recv().await {
                if let Err(panic) = catch_unwind(AssertUnwindSafe(task)) {
                    error!(panic = %panic_message(panic.as_ref()), "Main-lane task panicked");
                }
            }
        });

        Self {
            handle,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            main_tx,
        }
    }
}

impl ThreadScheduler for TokioScheduler {
    fn run_on_background(&self, task: BoxFuture<'static, ()>) {
        let permits = Arc::clone(&self.permits);
        self.handle.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            task.await;
        });
    }

    fn run_on_main(&self, task: MainTask) {
        if self.main_tx.send(task).is_err() {
            warn!("Main lane is closed, dropping task");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
