//! Waiting for an assistant run to finish.
//!
//! The wait is a bounded loop: the delay between status checks starts at
//! [`PollPolicy::initial_interval`] and doubles up to
//! [`PollPolicy::max_interval`]. Once [`PollPolicy::timeout`] has elapsed
//! without a terminal status the wait gives up with
//! [`UpstreamError::RunTimeout`]. Failed status checks are not retried.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::error::{Result, UpstreamError};
use super::types::{Run, RunStatus};
use super::AssistantsApi;

/// Backoff schedule and deadline for run polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Shortest pause between two status checks, whatever the policy says.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

impl PollPolicy {
    /// Delay to use after `current`. Never below [`MIN_POLL_INTERVAL`].
    #[must_use]
    pub fn next_interval(&self, current: Duration) -> Duration {
        current
            .saturating_mul(2)
            .min(self.max_interval)
            .max(MIN_POLL_INTERVAL)
    }
}

/// Start a run of `assistant_id` on `thread_id` and wait for it to stop.
///
/// Returns the run in whatever terminal state it reached; callers decide
/// what a non-`completed` outcome means for them.
pub async fn run_to_completion<A>(
    api: &A,
    thread_id: &str,
    assistant_id: &str,
    policy: &PollPolicy,
) -> Result<Run>
where
    A: AssistantsApi + ?Sized,
{
    let run = api.create_run(thread_id, assistant_id).await?;
    info!(
        name: "run.created",
        run_id = %run.id,
        thread_id = %thread_id,
        status = %run.status,
        "Assistant run created"
    );
    wait_for_run(api, thread_id, run, policy).await
}

/// Poll `run` until it reaches a terminal status or the deadline passes.
pub async fn wait_for_run<A>(api: &A, thread_id: &str, mut run: Run, policy: &PollPolicy) -> Result<Run>
where
    A: AssistantsApi + ?Sized,
{
    let started = Instant::now();
    let mut interval = policy.initial_interval.max(MIN_POLL_INTERVAL);
    let mut checks: u32 = 0;

    while !run.status.is_terminal() {
        let waited = started.elapsed();
        if waited >= policy.timeout {
            warn!(
                name: "run.timeout",
                run_id = %run.id,
                status = %run.status,
                checks,
                "Run did not finish before the poll deadline"
            );
            return Err(UpstreamError::RunTimeout {
                run_id: run.id,
                status: run.status,
                waited,
            });
        }

        tokio::time::sleep(interval.min(policy.timeout - waited)).await;
        run = api.retrieve_run(thread_id, &run.id).await?;
        checks += 1;
        debug!(run_id = %run.id, status = %run.status, checks, "Run polled");
        interval = policy.next_interval(interval);
    }

    if run.status == RunStatus::Completed {
        info!(name: "run.finished", run_id = %run.id, checks, "Run completed");
    } else {
        warn!(
            name: "run.finished",
            run_id = %run.id,
            status = %run.status,
            error = ?run.last_error,
            "Run stopped without completing"
        );
    }
    Ok(run)
}
