//! # Design
//!
//! - Passes run strictly one after another on a blocking worker thread; the
//!   async side only sleeps and listens for stop requests.
//! - Before the first pass the loop sleeps until the next wall-clock boundary of
//!   the interval (a few seconds past a boundary counts as aligned).
//! - After a pass that overran the interval the next wait is doubled.
//! - A stop wakes any sleep immediately but never interrupts a pass in flight.
//! - Any pass error is terminal and reported as [`SchedulerExit::Fatal`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveTime, TimeDelta, Timelike};
use tokio::sync::watch;
use tracing::{Span, error, info};

use nfesel_config::WATERMARK_FORMAT;

use crate::coordinator::RunPass;
use crate::error::RunError;

/// Seconds past a boundary that still count as aligned.
const ALIGNMENT_TOLERANCE_SECS: u32 = 5;

/// Lifecycle of the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Constructed but not started.
    Idle,
    /// A pass is executing.
    Running,
    /// Sleeping until the next pass.
    Waiting,
    /// The loop has exited.
    Stopped,
}

/// Why the scheduler loop exited.
#[derive(Debug)]
pub enum SchedulerExit {
    /// A stop was requested through a [`StopHandle`].
    Stopped,
    /// A pass failed; the service must not continue.
    Fatal(RunError),
}

/// Timing parameters for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSettings {
    /// Standard wait between passes.
    pub interval: Duration,
    /// Align the first pass on wall-clock multiples of this many minutes.
    pub align_minutes: Option<u32>,
}

impl ScheduleSettings {
    /// Passes every `minutes`, with the first one aligned on the same boundary.
    #[must_use]
    pub fn every_minutes(minutes: u32) -> Self {
        Self {
            interval: Duration::from_secs(u64::from(minutes) * 60),
            align_minutes: Some(minutes),
        }
    }
}

/// Cloneable handle used to stop the scheduler and observe its state.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop: Arc<watch::Sender<bool>>,
    state: watch::Receiver<SchedulerState>,
}

impl StopHandle {
    /// Request a graceful stop. Idempotent.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        *self.stop.borrow()
    }

    /// Current scheduler state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Receiver notified on every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.clone()
    }
}

/// Owns a [`RunPass`] and executes it on a fixed cadence until stopped.
pub struct Scheduler<P> {
    pass: P,
    settings: ScheduleSettings,
    handle: StopHandle,
    stop_rx: watch::Receiver<bool>,
    state_tx: watch::Sender<SchedulerState>,
}

impl<P: RunPass + 'static> Scheduler<P> {
    /// Build an idle scheduler around `pass`.
    #[must_use]
    pub fn new(pass: P, settings: ScheduleSettings) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        Self {
            pass,
            settings,
            handle: StopHandle {
                stop: Arc::new(stop_tx),
                state: state_rx,
            },
            stop_rx,
            state_tx,
        }
    }

    /// Handle that can stop this scheduler from another task.
    #[must_use]
    pub fn handle(&self) -> StopHandle {
        self.handle.clone()
    }

    /// Run passes until a stop is requested or a pass fails.
    pub async fn run(self) -> SchedulerExit {
        let Self {
            pass,
            settings,
            handle: _handle,
            mut stop_rx,
            state_tx,
        } = self;
        let mut pass = Some(pass);

        let first_delay = settings
            .align_minutes
            .and_then(|minutes| delay_until_aligned(Local::now().time(), minutes))
            .unwrap_or_default();
        let first_run =
            Local::now() + TimeDelta::from_std(first_delay).unwrap_or(TimeDelta::zero());
        info!(
            interval_secs = settings.interval.as_secs(),
            first_run = %first_run.format(WATERMARK_FORMAT),
            "NF-e selector service started"
        );

        if !first_delay.is_zero() {
            state_tx.send_replace(SchedulerState::Waiting);
            if wait_or_stop(first_delay, &mut stop_rx).await {
                return finish(&state_tx, SchedulerExit::Stopped);
            }
        }

        loop {
            if *stop_rx.borrow() {
                return finish(&state_tx, SchedulerExit::Stopped);
            }
            let Some(current) = pass.take() else {
                return finish(
                    &state_tx,
                    SchedulerExit::Fatal(RunError::Worker {
                        detail: "run pass unavailable".to_string(),
                    }),
                );
            };

            state_tx.send_replace(SchedulerState::Running);
            let started = Instant::now();
            let span = Span::current();
            let joined = tokio::task::spawn_blocking(move || {
                let _entered = span.enter();
                let mut current = current;
                let result = current.run_pass();
                (current, result)
            })
            .await;
            let elapsed = started.elapsed();

            match joined {
                Ok((returned, Ok(_report))) => pass = Some(returned),
                Ok((_, Err(err))) => return finish(&state_tx, SchedulerExit::Fatal(err)),
                Err(err) => {
                    return finish(
                        &state_tx,
                        SchedulerExit::Fatal(RunError::Worker {
                            detail: err.to_string(),
                        }),
                    );
                }
            }

            state_tx.send_replace(SchedulerState::Waiting);
            if wait_or_stop(wait_after_pass(elapsed, settings.interval), &mut stop_rx).await {
                return finish(&state_tx, SchedulerExit::Stopped);
            }
        }
    }
}

/// Delay from `now` until the next boundary that is a multiple of `interval_minutes`.
///
/// Returns `None` when `now` is within a few seconds past such a boundary.
/// Boundaries restart at the top of every hour.
#[must_use]
pub fn delay_until_aligned(now: NaiveTime, interval_minutes: u32) -> Option<Duration> {
    let interval = interval_minutes.max(1);
    let minute = now.minute();
    let second = now.second();
    if minute % interval == 0 && second <= ALIGNMENT_TOLERANCE_SECS {
        return None;
    }
    let minutes_ahead = (interval - minute % interval).min(60 - minute);
    let boundary = Duration::from_secs(u64::from(minutes_ahead) * 60);
    let into_minute = Duration::new(
        u64::from(second),
        now.nanosecond().min(999_999_999),
    );
    Some(boundary.saturating_sub(into_minute))
}

/// Wait after a pass that took `elapsed`: twice the interval when the pass overran it.
#[must_use]
pub fn next_wait(elapsed: Duration, interval: Duration) -> Duration {
    if elapsed > interval {
        interval.saturating_mul(2)
    } else {
        interval
    }
}

fn wait_after_pass(elapsed: Duration, interval: Duration) -> Duration {
    let wait = next_wait(elapsed, interval);
    if wait > interval {
        info!(
            elapsed_secs = elapsed.as_secs(),
            wait_secs = wait.as_secs(),
            "last pass took longer than the interval; waiting twice the interval"
        );
    }
    wait
}

async fn wait_or_stop(delay: Duration, stop: &mut watch::Receiver<bool>) -> bool {
    if *stop.borrow_and_update() {
        return true;
    }
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            () = &mut sleep => return *stop.borrow(),
            changed = stop.changed() => {
                if changed.is_err() {
                    (&mut sleep).await;
                    return false;
                }
                if *stop.borrow_and_update() {
                    return true;
                }
            }
        }
    }
}

fn finish(state_tx: &watch::Sender<SchedulerState>, exit: SchedulerExit) -> SchedulerExit {
    state_tx.send_replace(SchedulerState::Stopped);
    let stopped_at = Local::now().format(WATERMARK_FORMAT);
    match &exit {
        SchedulerExit::Stopped => {
            info!(stopped_at = %stopped_at, "NF-e selector service stopped on request");
        }
        SchedulerExit::Fatal(err) => {
            error!(
                stopped_at = %stopped_at,
                kind = err.kind(),
                error = %err,
                "NF-e selector service stopped after a fatal run error"
            );
        }
    }
    exit
}
