//! # Background Runner
//!
//! Drives a viewer from a worker thread so `view()` returns immediately.
//! The worker wakes once per poll interval, redisplays the most recently
//! submitted grids if a redisplay is pending, and pumps window events.
//! Grids submitted between two wake-ups coalesce: only the last list is
//! shown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::controller::InterruptHandle;
use super::system::SharedController;
use crate::foundation::logging::thread_label;
use crate::foundation::sync::lock;
use crate::grid::GridList;

struct RunnerShared {
    controller: SharedController,
    interrupt: InterruptHandle,
    redisplay: AtomicBool,
    closed: Mutex<bool>,
    wake: Condvar,
    grids: Mutex<GridList>,
    poll_interval: Duration,
}

/// Owns the background worker thread
pub struct BackgroundRunner {
    shared: Arc<RunnerShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundRunner {
    /// Create an idle runner; the worker starts on the first [`Self::view`].
    pub fn new(controller: SharedController, poll_interval: Duration) -> Self {
        let interrupt = lock(&controller).interrupt_handle();
        Self {
            shared: Arc::new(RunnerShared {
                controller,
                interrupt,
                redisplay: AtomicBool::new(false),
                closed: Mutex::new(false),
                wake: Condvar::new(),
                grids: Mutex::new(GridList::new()),
                poll_interval,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Submit grids for display and make sure the worker is running.
    ///
    /// Returns without waiting for the redisplay.
    pub fn view(&self, grids: GridList) {
        *lock(&self.shared.grids) = grids;
        *lock(&self.shared.closed) = false;
        self.shared.redisplay.store(true, Ordering::Release);

        let mut worker = lock(&self.worker);
        if worker.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(finished) = worker.take() {
                join_worker(finished);
            }
        }
        if worker.is_none() {
            let shared = Arc::clone(&self.shared);
            match thread::Builder::new()
                .name("game-window-runner".to_string())
                .spawn(move || run(&shared))
            {
                Ok(handle) => *worker = Some(handle),
                Err(e) => log::error!("failed to start viewer thread: {e}"),
            }
        }
    }

    /// Stop the worker, waiting for it to exit, then close the window.
    ///
    /// A redisplay that was pending is abandoned; one already in progress
    /// completes before this returns. Safe to call when nothing runs.
    pub fn close(&self) {
        self.shutdown();
        lock(&self.shared.controller).close();
    }

    /// Has no effect; resizing goes straight to the controller.
    pub fn resize(&self, width: u32, height: u32) {
        log::trace!("background runner ignores resize to {width}x{height}");
    }

    /// Whether a worker thread exists
    pub fn is_running(&self) -> bool {
        lock(&self.worker).as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stop and join the worker, leaving the window as it is.
    pub fn shutdown(&self) {
        self.shared.redisplay.store(false, Ordering::Release);
        {
            let mut closed = lock(&self.shared.closed);
            *closed = true;
            self.shared.wake.notify_all();
        }

        let worker = lock(&self.worker).take();
        if let Some(worker) = worker {
            self.shared.interrupt.interrupt();
            join_worker(worker);
            self.shared.interrupt.clear();
        }
    }
}

impl Drop for BackgroundRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn join_worker(worker: JoinHandle<()>) {
    if worker.join().is_err() {
        log::error!("viewer thread panicked");
    }
}

fn run(shared: &RunnerShared) {
    log::debug!("viewer thread started on {}", thread_label());
    loop {
        let closed = {
            let closed = lock(&shared.closed);
            let (closed, _) = shared
                .wake
                .wait_timeout_while(closed, shared.poll_interval, |closed| !*closed)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *closed
        };
        if closed {
            break;
        }

        if shared
            .redisplay
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let grids = lock(&shared.grids).clone();
            lock(&shared.controller).view(grids);
        }

        let mut controller = lock(&shared.controller);
        controller.handle_events();
        // An interrupt also flags should-close; leave that window to the closer.
        if controller.is_open() && controller.should_close() && !controller.is_interrupted() {
            log::debug!("window closed by user, stopping viewer thread");
            controller.close();
            break;
        }
    }
    log::debug!("viewer thread exiting on {}", thread_label());
}
