use std::sync::mpsc;

use tracing::{debug, trace};

use crate::core::Record;

/// Producer of full dataset snapshots at discrete times.
///
/// Sources are polled from the host's frame loop; they never block and
/// cannot be restarted.
pub trait DataSource {
    /// Snapshot due at `now_ms`, if any.
    fn poll(&mut self, now_ms: f64) -> Option<Vec<Record>>;

    /// `true` once the source can never emit again.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Periodic source: first emission on the first poll, then every `period_ms`.
///
/// Missed periods are coalesced into a single emission.
pub struct TimerSource<G> {
    period_ms: f64,
    next_due_ms: Option<f64>,
    emitted: u64,
    generator: G,
}

impl<G> TimerSource<G>
where
    G: FnMut(u64) -> Vec<Record>,
{
    /// `generator` receives the emission sequence number, starting at 0.
    pub fn new(period_ms: f64, generator: G) -> Self {
        Self {
            period_ms,
            next_due_ms: None,
            emitted: 0,
            generator,
        }
    }

    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl<G> DataSource for TimerSource<G>
where
    G: FnMut(u64) -> Vec<Record>,
{
    fn poll(&mut self, now_ms: f64) -> Option<Vec<Record>> {
        if !now_ms.is_finite() {
            return None;
        }
        let due = *self.next_due_ms.get_or_insert(now_ms);
        if now_ms < due {
            return None;
        }

        let period = if self.period_ms.is_finite() && self.period_ms > 0.0 {
            self.period_ms
        } else {
            f64::INFINITY
        };
        let missed = ((now_ms - due) / period).floor();
        if missed >= 1.0 {
            debug!(missed, "timer source coalescing missed periods");
        }
        self.next_due_ms = Some(due + (missed + 1.0) * period);

        let sequence = self.emitted;
        self.emitted += 1;
        trace!(sequence, now_ms, "timer source emitting");
        Some((self.generator)(sequence))
    }
}

/// Finite source replaying one snapshot per poll.
pub struct IterSource<I> {
    snapshots: I,
    exhausted: bool,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Vec<Record>>,
{
    pub fn new<T>(snapshots: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            snapshots: snapshots.into_iter(),
            exhausted: false,
        }
    }
}

impl<I> DataSource for IterSource<I>
where
    I: Iterator<Item = Vec<Record>>,
{
    fn poll(&mut self, _now_ms: f64) -> Option<Vec<Record>> {
        if self.exhausted {
            return None;
        }
        let next = self.snapshots.next();
        self.exhausted = next.is_none();
        next
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Snapshots pushed by another thread through a channel.
///
/// Each poll drains the channel and keeps only the newest snapshot.
pub struct ChannelSource {
    receiver: mpsc::Receiver<Vec<Record>>,
    disconnected: bool,
}

impl ChannelSource {
    #[must_use]
    pub fn new(receiver: mpsc::Receiver<Vec<Record>>) -> Self {
        Self {
            receiver,
            disconnected: false,
        }
    }

    /// Creates a connected sender/source pair.
    #[must_use]
    pub fn channel() -> (mpsc::Sender<Vec<Record>>, Self) {
        let (sender, receiver) = mpsc::channel();
        (sender, Self::new(receiver))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self, _now_ms: f64) -> Option<Vec<Record>> {
        let mut latest = None;
        let mut drained = 0usize;
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => {
                    drained += 1;
                    latest = Some(snapshot);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        debug!("channel source disconnected");
                    }
                    self.disconnected = true;
                    break;
                }
            }
        }
        if drained > 1 {
            trace!(dropped = drained - 1, "channel source kept newest snapshot");
        }
        latest
    }

    fn is_exhausted(&self) -> bool {
        self.disconnected
    }
}
