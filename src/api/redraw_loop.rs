use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ChartLayout, DataSource, JoinSummary, RenderTarget, TickSummary};
use crate::core::Record;
use crate::error::{ChartError, ChartResult};
use crate::render::Surface;

/// Anything a redraw loop can drive: a single render target or a group.
pub trait Redraw {
    fn is_initialized(&self) -> bool;

    fn initialize(&mut self, records: &[Record]) -> ChartResult<JoinSummary>;

    fn update(&mut self, records: &[Record]) -> ChartResult<JoinSummary>;

    fn tick(&mut self, now_ms: f64) -> TickSummary;

    fn teardown(&mut self) -> usize;

    /// Initializes on the first snapshot, updates on every later one.
    fn redraw(&mut self, records: &[Record]) -> ChartResult<JoinSummary> {
        if self.is_initialized() {
            self.update(records)
        } else {
            self.initialize(records)
        }
    }
}

impl<L: ChartLayout, S: Surface> Redraw for RenderTarget<L, S> {
    fn is_initialized(&self) -> bool {
        RenderTarget::is_initialized(self)
    }

    fn initialize(&mut self, records: &[Record]) -> ChartResult<JoinSummary> {
        RenderTarget::initialize(self, records)
    }

    fn update(&mut self, records: &[Record]) -> ChartResult<JoinSummary> {
        RenderTarget::update(self, records)
    }

    fn tick(&mut self, now_ms: f64) -> TickSummary {
        RenderTarget::tick(self, now_ms)
    }

    fn teardown(&mut self) -> usize {
        RenderTarget::teardown(self)
    }
}

/// Several render targets fed from the same stream, such as bars and their labels.
///
/// Each member keeps its own state; a failing member does not stop the others
/// from redrawing.
#[derive(Default)]
pub struct ChartGroup {
    members: Vec<Box<dyn Redraw>>,
}

impl ChartGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_member(mut self, member: Box<dyn Redraw>) -> Self {
        self.members.push(member);
        self
    }

    pub fn push(&mut self, member: Box<dyn Redraw>) {
        self.members.push(member);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn for_each_member<F>(&mut self, mut apply: F) -> ChartResult<JoinSummary>
    where
        F: FnMut(&mut dyn Redraw) -> ChartResult<JoinSummary>,
    {
        let mut total = JoinSummary::default();
        let mut first_error: Option<ChartError> = None;
        for (index, member) in self.members.iter_mut().enumerate() {
            match apply(member.as_mut()) {
                Ok(summary) => {
                    total.entered += summary.entered;
                    total.updated += summary.updated;
                    total.exited += summary.exited;
                    total.revived += summary.revived;
                }
                Err(err) => {
                    warn!(member = index, error = %err, "chart group member failed to redraw");
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(total),
        }
    }
}

impl Redraw for ChartGroup {
    fn is_initialized(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(|member| member.is_initialized())
    }

    fn initialize(&mut self, records: &[Record]) -> ChartResult<JoinSummary> {
        self.for_each_member(|member| member.initialize(records))
    }

    fn update(&mut self, records: &[Record]) -> ChartResult<JoinSummary> {
        self.for_each_member(|member| member.update(records))
    }

    fn tick(&mut self, now_ms: f64) -> TickSummary {
        let mut total = TickSummary::default();
        for member in &mut self.members {
            let summary = member.tick(now_ms);
            total.writes += summary.writes;
            total.surface_errors += summary.surface_errors;
            total.removed.extend(summary.removed);
            total.finished.extend(summary.finished);
        }
        total
    }

    fn teardown(&mut self) -> usize {
        self.members.iter_mut().map(|member| member.teardown()).sum()
    }

    /// Lets every member pick initialize or update on its own.
    fn redraw(&mut self, records: &[Record]) -> ChartResult<JoinSummary> {
        self.for_each_member(|member| member.redraw(records))
    }
}

/// Result of one [`StreamDrivenRedrawLoop::advance`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopStep {
    pub tick: TickSummary,
    /// Present when the source emitted during this step.
    pub redraw: Option<JoinSummary>,
}

/// Snapshot rejected by the redraw target.
///
/// The tick that ran before the snapshot was polled is kept, so removals it
/// finished are not lost.
#[derive(Debug, Error)]
#[error("snapshot rejected: {error}")]
pub struct RedrawError {
    pub tick: TickSummary,
    #[source]
    pub error: ChartError,
}

impl From<RedrawError> for ChartError {
    fn from(err: RedrawError) -> Self {
        err.error
    }
}

/// Feeds every snapshot of a data source into a render target.
///
/// Hosts call [`advance`](Self::advance) from their frame clock. Animations are
/// ticked first so a redraw interrupts them from their latest values.
pub struct StreamDrivenRedrawLoop<T: Redraw, D: DataSource> {
    target: T,
    source: Option<D>,
    emissions: u64,
}

impl<T: Redraw, D: DataSource> StreamDrivenRedrawLoop<T, D> {
    pub fn new(target: T, source: D) -> Self {
        debug!("redraw loop subscribed");
        Self {
            target,
            source: Some(source),
            emissions: 0,
        }
    }

    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.source.is_some()
    }

    /// Snapshots received so far.
    #[must_use]
    pub fn emissions(&self) -> u64 {
        self.emissions
    }

    /// Ticks animations to `now_ms`, then redraws if the source emitted.
    ///
    /// A rejected snapshot is reported as an error carrying the tick that
    /// already ran; the loop stays subscribed.
    pub fn advance(&mut self, now_ms: f64) -> Result<LoopStep, RedrawError> {
        let tick = self.target.tick(now_ms);
        let Some(source) = self.source.as_mut() else {
            return Ok(LoopStep { tick, redraw: None });
        };
        let Some(records) = source.poll(now_ms) else {
            return Ok(LoopStep { tick, redraw: None });
        };

        self.emissions += 1;
        debug!(
            emission = self.emissions,
            records = records.len(),
            initialized = self.target.is_initialized(),
            "stream emitted snapshot"
        );
        match self.target.redraw(&records) {
            Ok(summary) => Ok(LoopStep {
                tick,
                redraw: Some(summary),
            }),
            Err(error) => {
                warn!(
                    emission = self.emissions,
                    removed = tick.removed.len(),
                    error = %error,
                    "stream snapshot rejected"
                );
                Err(RedrawError { tick, error })
            }
        }
    }

    /// Stops delivery and hands the source back.
    pub fn unsubscribe(&mut self) -> Option<D> {
        let source = self.source.take();
        if source.is_some() {
            debug!(emissions = self.emissions, "redraw loop unsubscribed");
        }
        source
    }

    /// Unsubscribes, then abandons in-flight transitions of the target.
    pub fn teardown(&mut self) -> usize {
        self.unsubscribe();
        self.target.teardown()
    }

    pub fn into_target(mut self) -> T {
        self.unsubscribe();
        self.target
    }
}
