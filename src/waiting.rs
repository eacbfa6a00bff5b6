//! Blocking waits for asynchronous renders.
//!
//! A wait re-checks its condition after every render of the fragment and
//! fails once the timeout elapses. Exceptions captured by the renderer in
//! the meantime end the wait early.

use std::fmt;
use std::time::{Duration, Instant};

use crate::rendered::RenderedFragment;
use crate::{Error, Result};

impl RenderedFragment {
    /// Waits until `predicate` holds, using the renderer's default timeout.
    pub fn wait_for_state(&self, predicate: impl FnMut(&RenderedFragment) -> bool) -> Result<()> {
        let timeout = self.state().renderer()?.default_wait_timeout();
        self.wait_for_state_within(timeout, predicate)
    }

    pub fn wait_for_state_within(
        &self,
        timeout: Duration,
        mut predicate: impl FnMut(&RenderedFragment) -> bool,
    ) -> Result<()> {
        self.wait_until(timeout, |fragment| {
            if predicate(fragment) {
                Ok(())
            } else {
                Err("the state predicate to pass".to_string())
            }
        })
    }

    /// Waits until `assertion` succeeds, using the renderer's default
    /// timeout. On timeout the error names the last failure.
    pub fn wait_for_assertion<E: fmt::Display>(
        &self,
        assertion: impl FnMut(&RenderedFragment) -> std::result::Result<(), E>,
    ) -> Result<()> {
        let timeout = self.state().renderer()?.default_wait_timeout();
        self.wait_for_assertion_within(timeout, assertion)
    }

    pub fn wait_for_assertion_within<E: fmt::Display>(
        &self,
        timeout: Duration,
        mut assertion: impl FnMut(&RenderedFragment) -> std::result::Result<(), E>,
    ) -> Result<()> {
        self.wait_until(timeout, |fragment| {
            assertion(fragment)
                .map_err(|error| format!("the assertion to pass (last failure: {error})"))
        })
    }

    fn wait_until(
        &self,
        timeout: Duration,
        mut check: impl FnMut(&RenderedFragment) -> std::result::Result<(), String>,
    ) -> Result<()> {
        let state = self.state();
        let deadline = Instant::now() + timeout;
        let mut attempts = 0usize;
        loop {
            let seen = state.render_generation();
            state.renderer()?.rethrow_unhandled()?;
            state.ensure_live()?;

            attempts += 1;
            let condition = match check(self) {
                Ok(()) => {
                    tracing::trace!(attempts, "wait.satisfied");
                    return Ok(());
                }
                Err(condition) => condition,
            };

            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(attempts, timeout_ms = timeout.as_millis() as u64, "wait.timed_out");
                return Err(Error::WaitTimeout { timeout, condition });
            }
            state.wait_for_render(seen, deadline - now);
        }
    }
}
