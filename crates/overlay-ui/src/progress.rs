//! Linear and circular progress bars.
//!
//! Both run the same machine: a 0..=100 counter advanced once per
//! `duration / 100`. Reaching 100 or a `progressCancel` (which parks the
//! counter at 99) stops the clock and closes the bar; `progressComplete`
//! is sent once the exit transition is over, exactly once per run.

use std::future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval};
use tracing::debug;

use overlay_bridge::SubscriptionSet;
use overlay_common::{Endpoint, HostEvent, InboundEvent, PayloadError};

use crate::component::{forward, Mounted};
use crate::context::{decode, OverlayContext};
use crate::state::{OverlayCell, OverlayKind, OverlayState};

const MIN_TICK: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPosition {
    #[default]
    Middle,
    Bottom,
}

/// `progress` / `circleProgress` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressProps {
    /// Total run time in milliseconds.
    pub duration: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub position: Option<ProgressPosition>,
}

impl ProgressProps {
    fn parse(event: &InboundEvent) -> Result<Self, PayloadError> {
        let props: ProgressProps = decode(event)?;
        if !props.duration.is_finite() || props.duration <= 0.0 {
            return Err(PayloadError::Invalid {
                event: event.name.clone(),
                reason: format!("duration must be positive, got {}", props.duration),
            });
        }
        Ok(props)
    }

    /// Time between two counter steps.
    pub fn tick_period(&self) -> Duration {
        Duration::from_micros((self.duration * 10.0).round() as u64).max(MIN_TICK)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub label: String,
    pub position: ProgressPosition,
    pub duration_ms: u64,
    /// 0..=100.
    pub value: u8,
    pub cancelled: bool,
}

enum ProgressCommand {
    Start(ProgressProps),
    Cancel,
}

/// Mounted progress bar, linear or circular.
pub struct ProgressBar {
    inner: Mounted<ProgressCommand, ProgressView>,
    kind: OverlayKind,
}

impl ProgressBar {
    /// Bar driven by `progress`.
    pub fn mount_linear(ctx: &OverlayContext) -> Self {
        Self::mount(ctx, OverlayKind::Progress, HostEvent::Progress)
    }

    /// Ring driven by `circleProgress`.
    pub fn mount_circle(ctx: &OverlayContext) -> Self {
        Self::mount(ctx, OverlayKind::CircleProgress, HostEvent::CircleProgress)
    }

    fn mount(ctx: &OverlayContext, kind: OverlayKind, start: HostEvent) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (cell, state) = OverlayCell::new(kind);

        let mut subscriptions = SubscriptionSet::new();
        forward(&ctx.bus, &mut subscriptions, kind, start, &tx, |e| {
            ProgressProps::parse(e).map(ProgressCommand::Start)
        });
        forward(&ctx.bus, &mut subscriptions, kind, HostEvent::ProgressCancel, &tx, |_| {
            Ok(ProgressCommand::Cancel)
        });

        let machine = ProgressMachine {
            ctx: ctx.clone(),
            cell,
            clock: None,
        };
        let task = tokio::spawn(machine.run(rx));
        Self {
            inner: Mounted::new(kind, tx, state, subscriptions, task),
            kind,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    pub fn state(&self) -> OverlayState<ProgressView> {
        self.inner.state()
    }

    pub fn watch(&self) -> watch::Receiver<OverlayState<ProgressView>> {
        self.inner.watch()
    }

    pub async fn unmount(self) {
        self.inner.unmount().await;
    }
}

enum Step {
    Command(Option<ProgressCommand>),
    Tick,
}

struct ProgressMachine {
    ctx: OverlayContext,
    cell: OverlayCell<ProgressView>,
    clock: Option<Interval>,
}

impl ProgressMachine {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<ProgressCommand>) {
        loop {
            let step = tokio::select! {
                command = commands.recv() => Step::Command(command),
                _ = next_tick(&mut self.clock) => Step::Tick,
            };
            match step {
                Step::Command(Some(ProgressCommand::Start(props))) => self.start(props).await,
                Step::Command(Some(ProgressCommand::Cancel)) => self.finish(true).await,
                Step::Command(None) => break,
                Step::Tick => self.tick().await,
            }
        }
        self.stop_clock();
    }

    async fn start(&mut self, props: ProgressProps) {
        // A run still on screen is cancelled before the new one starts.
        self.finish(true).await;

        let period = props.tick_period();
        self.cell.open(ProgressView {
            label: props.label.unwrap_or_default(),
            position: props.position.unwrap_or_default(),
            duration_ms: props.duration.round() as u64,
            value: 0,
            cancelled: false,
        });
        self.clock = Some(tokio::time::interval_at(Instant::now() + period, period));
        debug!(kind = %self.cell.kind(), period_us = period.as_micros() as u64, "progress started");
    }

    async fn tick(&mut self) {
        let mut done = false;
        self.cell.update(|view| {
            view.value = view.value.saturating_add(1).min(100);
            done = view.value >= 100;
        });
        if done {
            self.finish(false).await;
        }
    }

    /// End the current run, if any: stop the clock, close, report.
    async fn finish(&mut self, cancelled: bool) {
        self.stop_clock();
        if cancelled {
            self.cell.update(|view| {
                view.value = 99;
                view.cancelled = true;
            });
        }
        if !self.cell.begin_close() {
            return;
        }
        self.cell.finish_close(self.ctx.timings().fade_exit()).await;
        debug!(kind = %self.cell.kind(), cancelled, "progress finished");
        self.ctx.notify(Endpoint::ProgressComplete, None);
    }

    fn stop_clock(&mut self) {
        if self.clock.take().is_some() {
            debug!(kind = %self.cell.kind(), "clock stopped");
        }
    }
}

async fn next_tick(clock: &mut Option<Interval>) {
    match clock {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}
