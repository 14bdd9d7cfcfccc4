//! Periodic background checks with randomized stagger
//!
//! Each call to [`start_interval`] spawns one tokio task that checks
//! immediately, hands the result to a callback, then sleeps a jittered
//! interval before the next check. Checks never overlap within a task.

use crate::client::CheckClient;
use crate::error::{CheckError, CheckResult};
use crate::params::CheckParams;
use crate::response::CheckResponse;
use rand::Rng;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Pick a delay uniformly from `[0.75 * base, 1.25 * base]`.
///
/// Spreads out clients that share the same nominal interval.
pub fn random_stagger(base: Duration) -> Duration {
    let nanos = u64::try_from(base.as_nanos()).unwrap_or(u64::MAX);
    let quarter = nanos / 4;
    let low = nanos - quarter;
    let high = nanos.saturating_add(quarter);
    Duration::from_nanos(rand::rng().random_range(low..=high))
}

/// Handle to a running interval check
///
/// Dropping the handle stops the loop.
#[must_use = "dropping the handle stops the interval check"]
pub struct IntervalHandle {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl IntervalHandle {
    /// Stop scheduling checks.
    ///
    /// No new cycle starts after this returns and a pending result is
    /// dropped. A callback the task was already about to enter may still
    /// run once. Safe to call repeatedly, from any thread, and from inside
    /// the callback.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Stop and wait for the background task to exit
    pub async fn shutdown(mut self) -> CheckResult<()> {
        self.stop();
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| CheckError::Internal(format!("interval task failed: {}", e)))?;
        }
        Ok(())
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl CheckClient {
    /// Check now and then roughly every `interval` until stopped.
    ///
    /// Every result, error or not, goes to `callback`; errors never end the
    /// loop. When checks are disabled the callback receives the empty
    /// response each cycle.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start_interval<F>(
        &self,
        params: CheckParams,
        interval: Duration,
        callback: F,
    ) -> IntervalHandle
    where
        F: FnMut(CheckResult<CheckResponse>) + Send + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_interval(
            self.clone(),
            params,
            interval,
            callback,
            stop_rx,
        ));

        IntervalHandle {
            stop_tx,
            task: Some(task),
        }
    }
}

/// Run interval checks with the default HTTP transport
///
/// See [`CheckClient::start_interval`].
pub fn start_interval<F>(params: CheckParams, interval: Duration, callback: F) -> IntervalHandle
where
    F: FnMut(CheckResult<CheckResponse>) + Send + 'static,
{
    CheckClient::new().start_interval(params, interval, callback)
}

async fn run_interval<F>(
    client: CheckClient,
    params: CheckParams,
    interval: Duration,
    mut callback: F,
    mut stop_rx: watch::Receiver<bool>,
) where
    F: FnMut(CheckResult<CheckResponse>) + Send + 'static,
{
    loop {
        let result = client.check(&params).await;

        // The check itself is not cancelled; its result is dropped.
        // A stop() landing between this load and the call below still sees
        // this one callback run. Closing that window would mean stop()
        // blocking on the callback, which deadlocks a callback that stops.
        if *stop_rx.borrow() {
            break;
        }
        callback(result);

        let delay = random_stagger(interval);
        debug!(
            "Next update check for {} in {:?}",
            params.product, delay
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stop_rx.wait_for(|stopped| *stopped) => break,
        }
    }

    debug!("Interval check for {} stopped", params.product);
}
