/*
 * Runs each dialog request on its own detached worker thread.
 *
 * `submit` moves the request into a one-shot task and hands it to a
 * `WorkerSpawner`; the caller never waits for the dialog. The worker owns the
 * request until the invoker has delivered its result, then drops it and
 * exits. There is no queue and no limit on concurrent requests.
 *
 * If the worker cannot be started the request is taken back and failed on
 * the caller's thread, which is the only case where the callback does not run
 * on a worker.
 */
use crate::core::error::DialogError;
use crate::core::invoker::DialogInvoker;
use crate::core::request::RequestArgs;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

pub type WorkerTask = Box<dyn FnOnce() + Send + 'static>;

/*
 * Starts a task on a new thread that nobody joins. Abstracted so tests can
 * simulate thread creation failure or run tasks inline.
 */
pub trait WorkerSpawner: Send + Sync {
    fn spawn_detached(&self, name: String, task: WorkerTask) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct ThreadSpawner;

impl WorkerSpawner for ThreadSpawner {
    fn spawn_detached(&self, name: String, task: WorkerTask) -> io::Result<()> {
        // Dropping the JoinHandle detaches the thread.
        let _detached = thread::Builder::new().name(name).spawn(task)?;
        Ok(())
    }
}

type PendingRequest = Arc<Mutex<Option<RequestArgs>>>;

fn take_pending(slot: &Mutex<Option<RequestArgs>>) -> Option<RequestArgs> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

pub struct AsyncRunner {
    invoker: Arc<DialogInvoker>,
    spawner: Arc<dyn WorkerSpawner>,
    worker_name_prefix: String,
    submitted: AtomicUsize,
}

impl AsyncRunner {
    pub fn new(
        invoker: Arc<DialogInvoker>,
        spawner: Arc<dyn WorkerSpawner>,
        worker_name_prefix: impl Into<String>,
    ) -> Self {
        AsyncRunner {
            invoker,
            spawner,
            worker_name_prefix: worker_name_prefix.into(),
            submitted: AtomicUsize::new(0),
        }
    }

    /// Number of requests submitted so far.
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn submit(&self, args: RequestArgs) {
        let sequence = self.submitted.fetch_add(1, Ordering::Relaxed) + 1;
        let name = format!(
            "{}-{}-{}",
            self.worker_name_prefix,
            args.mode.name(),
            sequence
        );

        let pending: PendingRequest = Arc::new(Mutex::new(Some(args)));
        let worker_pending = Arc::clone(&pending);
        let invoker = Arc::clone(&self.invoker);
        let task: WorkerTask = Box::new(move || {
            if let Some(args) = take_pending(&worker_pending) {
                invoker.run(args);
            }
            log::trace!("AsyncRunner: Worker finished and released its request.");
        });

        log::debug!("AsyncRunner: Spawning worker '{name}'.");
        if let Err(e) = self.spawner.spawn_detached(name.clone(), task) {
            log::error!("AsyncRunner: Could not start worker '{name}': {e}");
            if let Some(args) = take_pending(&pending) {
                args.fail(DialogError::WorkerSpawnFailed(format!(
                    "Could not start dialog worker '{name}': {e}"
                )));
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod runner_tests;
