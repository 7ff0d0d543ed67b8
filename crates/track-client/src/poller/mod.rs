// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cancellable fixed-interval polling.
//!
//! A [`Poller`] owns one background task that periodically fetches a payload
//! from a [`PollSource`] and publishes it as a [`PollSnapshot`]. The task
//! keeps at most one request in flight: a manual refresh, a parameter change
//! or the next interval tick all drop the pending request before a new one is
//! issued, so only the newest result can reach the snapshot.
//!
//! Lifecycle: `Idle` until [`Poller::start`], then `Scheduled` for the
//! soft-start delay, then alternating `Polling` and `Idle`. [`Poller::stop`]
//! (or dropping the poller) moves it to `Cancelled`; a stopped poller can be
//! started again.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::{watch, Notify};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::api::ClientError;

/// Something a [`Poller`] can fetch from.
pub trait PollSource: Send + Sync + 'static {
    /// Request parameters; changing them restarts the polling cycle.
    type Params: Clone + Send + Sync + 'static;
    /// Payload published to the snapshot on success.
    type Output: Send + Sync + 'static;

    /// Perform one request. Dropping the returned future cancels it.
    fn fetch(
        &self,
        params: &Self::Params,
    ) -> impl Future<Output = Result<Self::Output, ClientError>> + Send;
}

/// What to do with the displayed payload when requests keep failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep showing the last good payload and only log failures.
    #[default]
    Retain,
    /// Clear the payload once this many consecutive requests have failed.
    ClearAfter(u32),
}

impl FailurePolicy {
    /// `0` means never clear.
    #[must_use]
    pub fn from_threshold(threshold: u32) -> Self {
        if threshold == 0 {
            Self::Retain
        } else {
            Self::ClearAfter(threshold)
        }
    }
}

/// Poller timing and failure handling.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between the starts of consecutive cycles.
    pub interval: Duration,
    /// Delay before the first request after start or a parameter change.
    pub soft_start: Duration,
    pub failure_policy: FailurePolicy,
    /// Whether the poller starts out visible.
    pub visible: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            soft_start: Duration::from_secs(1),
            failure_policy: FailurePolicy::default(),
            visible: true,
        }
    }
}

/// Current lifecycle phase of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerPhase {
    /// Not started, or waiting for the next interval tick.
    Idle,
    /// Waiting out the soft-start delay.
    Scheduled,
    /// A request is in flight.
    Polling,
    /// Stopped.
    Cancelled,
}

/// Point-in-time view of a poller's published state.
#[derive(Debug)]
pub struct PollSnapshot<T> {
    /// Latest payload, `None` before the first success or after a clear.
    pub data: Option<Arc<T>>,
    /// Incremented whenever `data` is replaced or cleared.
    pub generation: u64,
    pub phase: PollerPhase,
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl<T> Clone for PollSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            generation: self.generation,
            phase: self.phase,
            last_success: self.last_success,
            consecutive_failures: self.consecutive_failures,
            last_error: self.last_error.clone(),
        }
    }
}

impl<T> Default for PollSnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            generation: 0,
            phase: PollerPhase::Idle,
            last_success: None,
            consecutive_failures: 0,
            last_error: None,
        }
    }
}

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Shortest accepted polling interval.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// State shared between a poller handle and its task.
struct Shared<T> {
    name: String,
    state: RwLock<PollSnapshot<T>>,
    visible: AtomicBool,
    listener: RwLock<Option<Listener>>,
}

impl<T> Shared<T> {
    fn snapshot(&self) -> PollSnapshot<T> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    /// Apply `f` unless `token` has been cancelled, then notify the listener.
    ///
    /// The cancellation check happens under the write lock so a stopped task
    /// can never publish after [`Poller::stop`] has returned.
    fn update(&self, token: &CancellationToken, f: impl FnOnce(&mut PollSnapshot<T>)) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if token.is_cancelled() {
                return;
            }
            f(&mut *state);
        }
        self.notify();
    }

    fn notify(&self) {
        let listener = self
            .listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(listener) = listener {
            listener();
        }
    }

    fn set_phase(&self, token: &CancellationToken, phase: PollerPhase) {
        self.update(token, |s| s.phase = phase);
    }

    fn record_success(&self, token: &CancellationToken, output: T) {
        self.update(token, |s| {
            s.data = Some(Arc::new(output));
            s.generation += 1;
            s.last_success = Some(Utc::now());
            s.consecutive_failures = 0;
            s.last_error = None;
        });
    }

    fn record_failure(&self, token: &CancellationToken, error: String, policy: FailurePolicy) {
        let name = &self.name;
        self.update(token, |s| {
            s.consecutive_failures = s.consecutive_failures.saturating_add(1);
            warn!("[{}] poll failed ({} in a row): {}", name, s.consecutive_failures, error);
            s.last_error = Some(error);

            if let FailurePolicy::ClearAfter(limit) = policy {
                if s.consecutive_failures >= limit && s.data.is_some() {
                    warn!("[{}] clearing displayed data after {} consecutive failures", name, limit);
                    s.data = None;
                    s.generation += 1;
                }
            }
        });
    }
}

/// Periodic fetcher with an explicit start/stop lifecycle.
pub struct Poller<S: PollSource> {
    source: Arc<S>,
    config: PollerConfig,
    shared: Arc<Shared<S::Output>>,
    params_tx: watch::Sender<S::Params>,
    refresh: Arc<Notify>,
    cancel_token: Option<CancellationToken>,
}

impl<S: PollSource> std::fmt::Debug for Poller<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("name", &self.shared.name)
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl<S: PollSource> Poller<S> {
    /// Create an idle poller. Nothing is fetched until [`Poller::start`].
    #[must_use]
    pub fn new(name: impl Into<String>, source: S, params: S::Params, mut config: PollerConfig) -> Self {
        let name = name.into();
        if config.interval < MIN_INTERVAL {
            warn!("[{}] interval {:?} too short, using {:?}", name, config.interval, MIN_INTERVAL);
            config.interval = MIN_INTERVAL;
        }

        let (params_tx, _) = watch::channel(params);
        let shared = Arc::new(Shared {
            name,
            state: RwLock::new(PollSnapshot::default()),
            visible: AtomicBool::new(config.visible),
            listener: RwLock::new(None),
        });

        Self {
            source: Arc::new(source),
            config,
            shared,
            params_tx,
            refresh: Arc::new(Notify::new()),
            cancel_token: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    #[must_use]
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Spawn the polling task. Restarts it if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.cancel_token.is_some() {
            self.stop();
        }

        info!(
            "[{}] starting (interval {:?}, soft start {:?}, {:?})",
            self.shared.name, self.config.interval, self.config.soft_start, self.config.failure_policy
        );

        let token = CancellationToken::new();
        self.shared.set_phase(&token, PollerPhase::Scheduled);

        // A refresh permit left over from the previous task must not skip the soft start
        self.refresh = Arc::new(Notify::new());

        tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            Arc::clone(&self.shared),
            self.params_tx.subscribe(),
            Arc::clone(&self.refresh),
            token.clone(),
            self.config.clone(),
        ));

        self.cancel_token = Some(token);
    }

    /// Stop polling and cancel any in-flight request. The last payload stays
    /// readable.
    pub fn stop(&mut self) {
        let Some(token) = self.cancel_token.take() else {
            return;
        };
        info!("[{}] stopping", self.shared.name);
        token.cancel();

        {
            let mut state = self.shared.state.write().unwrap_or_else(PoisonError::into_inner);
            state.phase = PollerPhase::Cancelled;
        }
        self.shared.notify();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.cancel_token.is_some()
    }

    /// Replace the request parameters. A running poller cancels its current
    /// cycle and polls again after the soft-start delay.
    pub fn set_params(&self, params: S::Params) {
        self.params_tx.send_replace(params);
    }

    /// Modify the request parameters in place; see [`Poller::set_params`].
    pub fn update_params(&self, f: impl FnOnce(&mut S::Params)) {
        self.params_tx.send_modify(f);
    }

    #[must_use]
    pub fn params(&self) -> S::Params {
        self.params_tx.borrow().clone()
    }

    /// Start a new cycle now, cancelling any request in flight.
    pub fn refresh(&self) {
        if self.is_running() {
            self.refresh.notify_one();
        }
    }

    /// While hidden, interval ticks keep firing but no request is made and
    /// the published state is left untouched.
    pub fn set_visible(&self, visible: bool) {
        let was = self.shared.visible.swap(visible, Ordering::Relaxed);
        if was != visible {
            debug!("[{}] visible: {}", self.shared.name, visible);
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.shared.is_visible()
    }

    #[must_use]
    pub fn snapshot(&self) -> PollSnapshot<S::Output> {
        self.shared.snapshot()
    }

    /// Latest payload, if any.
    #[must_use]
    pub fn data(&self) -> Option<Arc<S::Output>> {
        self.snapshot().data
    }

    /// Register a callback run after every state change, e.g. to request a
    /// UI repaint. Called from the polling task.
    pub fn on_update(&self, listener: impl Fn() + Send + Sync + 'static) {
        *self.shared.listener.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(listener));
    }
}

impl<S: PollSource> Drop for Poller<S> {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}

async fn poll_loop<S: PollSource>(
    source: Arc<S>,
    shared: Arc<Shared<S::Output>>,
    mut params_rx: watch::Receiver<S::Params>,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
    config: PollerConfig,
) {
    let name = shared.name.clone();
    let mut next_cycle = Instant::now() + config.soft_start;
    let mut phase = PollerPhase::Scheduled;

    loop {
        shared.set_phase(&cancel, phase);

        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            () = sleep_until(next_cycle) => {}
            () = refresh.notified() => {
                debug!("[{}] manual refresh", name);
            }
            changed = params_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                info!("[{}] parameters changed, restarting cycle", name);
                next_cycle = Instant::now() + config.soft_start;
                phase = PollerPhase::Scheduled;
                continue;
            }
        }

        // Cadence is measured from the start of each cycle
        next_cycle = Instant::now() + config.interval;
        phase = PollerPhase::Idle;

        if !shared.is_visible() {
            debug!("[{}] hidden, skipping cycle", name);
            continue;
        }

        let params = params_rx.borrow_and_update().clone();
        shared.set_phase(&cancel, PollerPhase::Polling);
        debug!("[{}] polling", name);

        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            result = source.fetch(&params) => {
                if !shared.is_visible() {
                    debug!("[{}] hidden, discarding poll result", name);
                    continue;
                }
                match result {
                    Ok(output) => {
                        debug!("[{}] poll succeeded", name);
                        shared.record_success(&cancel, output);
                    }
                    Err(e) => shared.record_failure(&cancel, e.to_string(), config.failure_policy),
                }
            }
            () = sleep_until(next_cycle) => {
                if shared.is_visible() {
                    shared.record_failure(
                        &cancel,
                        "request still pending at next poll tick".to_string(),
                        config.failure_policy,
                    );
                }
            }
            () = refresh.notified() => {
                debug!("[{}] in-flight request superseded by refresh", name);
                next_cycle = Instant::now();
            }
            changed = params_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                info!("[{}] parameters changed, cancelling in-flight request", name);
                next_cycle = Instant::now() + config.soft_start;
                phase = PollerPhase::Scheduled;
            }
        }
    }
}
