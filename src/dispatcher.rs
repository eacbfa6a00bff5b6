//! Single-threaded execution context for all renderer work.
//!
//! The dispatcher owns one named worker thread running a current-thread tokio
//! runtime. Jobs posted to it run one at a time in submission order, and
//! futures spawned on it only make progress between jobs, so component code
//! never races with itself.
//!
//! Dropping the dispatcher lets the running job finish and discards the jobs
//! still queued; their callers see [`Error::DispatcherStopped`].

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle, ThreadId};

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::{Error, Result};

type Job = Box<dyn FnOnce() + Send>;

pub struct Dispatcher {
    sender: Option<mpsc::UnboundedSender<(Job, tracing::Span)>>,
    runtime: tokio::runtime::Handle,
    thread_id: ThreadId,
    worker: Mutex<Option<JoinHandle<()>>>,
    stopping: Arc<AtomicBool>,
}

impl Dispatcher {
    /// Starts the worker thread.
    pub fn new(thread_name: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(Error::DispatcherStart)?;
        let handle = runtime.handle().clone();
        let (sender, mut receiver) = mpsc::unbounded_channel::<(Job, tracing::Span)>();
        let stopping = Arc::new(AtomicBool::new(false));
        let stopped = Arc::clone(&stopping);

        let worker = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    while let Some((job, span)) = receiver.recv().await {
                        if stopped.load(Ordering::Acquire) {
                            tracing::trace!("dispatcher.job_discarded");
                            continue;
                        }
                        let _guard = span.enter();
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            tracing::error!("dispatcher.job_panicked");
                        }
                        drop(_guard);
                        // Let spawned continuations run between jobs.
                        tokio::task::yield_now().await;
                    }
                });
                tracing::trace!("dispatcher.stopped");
            })
            .map_err(Error::DispatcherStart)?;

        let thread_id = worker.thread().id();
        tracing::trace!(thread = thread_name, "dispatcher.started");
        Ok(Self {
            sender: Some(sender),
            runtime: handle,
            thread_id,
            worker: Mutex::new(Some(worker)),
            stopping,
        })
    }

    /// Whether the calling thread is the dispatcher's worker thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    pub fn runtime_handle(&self) -> &tokio::runtime::Handle {
        &self.runtime
    }

    /// Queues `work` without waiting for it.
    pub fn post(&self, work: impl FnOnce() + Send + 'static) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(Error::DispatcherStopped)?;
        sender
            .send((Box::new(work), tracing::Span::current()))
            .map_err(|_| Error::DispatcherStopped)
    }

    /// Runs `work` on the dispatcher and blocks until it returns. Calls made
    /// from the dispatcher thread run inline. A panic in `work` resumes on
    /// the calling thread.
    ///
    /// Must not be called from inside an async context; use
    /// [`Self::invoke_async`] there.
    pub fn invoke<R>(&self, work: impl FnOnce() -> R + Send + 'static) -> Result<R>
    where
        R: Send + 'static,
    {
        if self.is_current() {
            return Ok(work());
        }
        let (reply, outcome) = oneshot::channel();
        self.post(move || {
            let _ = reply.send(panic::catch_unwind(AssertUnwindSafe(work)));
        })?;
        match outcome.blocking_recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(_) => Err(Error::DispatcherStopped),
        }
    }

    /// Like [`Self::invoke`], for callers inside an async context. The
    /// returned future resolves on whichever runtime polls it.
    pub fn invoke_async<R>(
        &self,
        work: impl FnOnce() -> R + Send + 'static,
    ) -> impl Future<Output = Result<R>> + Send + 'static
    where
        R: Send + 'static,
    {
        let (reply, outcome) = oneshot::channel();
        let posted = self.post(move || {
            let _ = reply.send(panic::catch_unwind(AssertUnwindSafe(work)));
        });
        async move {
            posted?;
            match outcome.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(payload)) => panic::resume_unwind(payload),
                Err(_) => Err(Error::DispatcherStopped),
            }
        }
    }

    /// Spawns a future on the dispatcher's runtime.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(future);
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stopping.store(true, Ordering::Release);
        drop(self.sender.take());
        let Some(worker) = self.worker.lock().take() else {
            return;
        };
        if self.is_current() {
            // Dropped by one of its own jobs; the loop exits once that job
            // returns.
            return;
        }
        if worker.join().is_err() {
            tracing::warn!("dispatcher.worker_panicked");
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("thread_id", &self.thread_id)
            .field("running", &self.sender.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn client_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("client runtime")
    }

    #[test]
    fn invoke_runs_on_the_worker_thread() -> Result<()> {
        let dispatcher = Dispatcher::new("dispatcher-test")?;
        let name = dispatcher.invoke(|| thread::current().name().map(str::to_string))?;
        assert_eq!(name.as_deref(), Some("dispatcher-test"));
        assert!(!dispatcher.is_current());
        Ok(())
    }

    #[test]
    fn jobs_run_in_submission_order() -> Result<()> {
        let dispatcher = Dispatcher::new("dispatcher-order")?;
        let log = Arc::new(Mutex::new(Vec::new()));
        for index in 0..16 {
            let log = Arc::clone(&log);
            dispatcher.post(move || log.lock().push(index))?;
        }
        dispatcher.invoke(|| ())?;
        assert_eq!(*log.lock(), (0..16).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn nested_invoke_runs_inline() -> Result<()> {
        let dispatcher = Arc::new(Dispatcher::new("dispatcher-nested")?);
        let inner = Arc::clone(&dispatcher);
        let value = dispatcher.invoke(move || inner.invoke(|| 7))??;
        assert_eq!(value, 7);
        Ok(())
    }

    #[test]
    fn panics_resume_on_the_caller() -> Result<()> {
        let dispatcher = Dispatcher::new("dispatcher-panic")?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = dispatcher.invoke(|| panic!("boom"));
        }));
        assert!(outcome.is_err());
        assert_eq!(dispatcher.invoke(|| 1)?, 1);
        Ok(())
    }

    #[test]
    fn spawned_futures_progress_between_jobs() -> Result<()> {
        let dispatcher = Dispatcher::new("dispatcher-spawn")?;
        let hits = Arc::new(AtomicUsize::new(0));
        let (sender, receiver) = oneshot::channel::<()>();
        let seen = Arc::clone(&hits);
        dispatcher.spawn(async move {
            if receiver.await.is_ok() {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        dispatcher.invoke(move || {
            let _ = sender.send(());
        })?;
        dispatcher.invoke(|| ())?;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn invoke_async_resolves_on_another_runtime() -> Result<()> {
        let dispatcher = Dispatcher::new("dispatcher-async")?;
        let pending = dispatcher.invoke_async(|| {
            (7u32, thread::current().name().map(str::to_string))
        });
        let (value, thread_name) = client_runtime().block_on(pending)?;
        assert_eq!(value, 7);
        assert_eq!(thread_name.as_deref(), Some("dispatcher-async"));
        Ok(())
    }

    #[test]
    fn invoke_async_rejects_work_queued_when_dropped() -> Result<()> {
        let dispatcher = Dispatcher::new("dispatcher-async-stop")?;
        let (started, busy) = std::sync::mpsc::channel();
        dispatcher.post(move || {
            let _ = started.send(());
            thread::sleep(Duration::from_millis(100));
        })?;
        let _ = busy.recv();

        let pending = dispatcher.invoke_async(|| 7u32);
        drop(dispatcher);

        let outcome = client_runtime().block_on(pending);
        assert!(matches!(outcome, Err(Error::DispatcherStopped)), "{outcome:?}");
        Ok(())
    }
}
