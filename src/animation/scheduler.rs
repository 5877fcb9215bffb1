use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::animation::{AnimationRequest, Completion, PhasePlan};
use crate::error::ChartResult;
use crate::render::{AttrValue, Attributes, ElementId};

const FINISHED_HANDLE_HISTORY: usize = 256;

/// Identifies one `animate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionHandle(u64);

/// Progress of every element scheduled through one handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleStatus {
    Running { remaining: usize },
    Finished { completed: usize, interrupted: usize },
    /// Never issued, or evicted from the finished-handle history.
    Unknown,
}

/// Where an element currently sits inside its phase list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementPhase {
    Pending { phase: usize },
    Animating { phase: usize },
}

/// One attribute value produced by a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrWrite {
    pub element: ElementId,
    pub name: String,
    pub value: AttrValue,
}

/// Everything a tick asks the owner of the elements to apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutput {
    pub writes: Vec<AttrWrite>,
    /// Elements whose last phase finished during this tick.
    pub completed: Vec<ElementId>,
    /// Subset of `completed` that must now be destroyed.
    pub removals: Vec<ElementId>,
    pub finished: Vec<TransitionHandle>,
}

#[derive(Debug, Clone, PartialEq)]
enum PhaseState {
    Pending { starts_at: f64 },
    Animating { started_at: f64, from: Attributes },
}

#[derive(Debug, Clone)]
struct Timeline {
    handle: TransitionHandle,
    index: usize,
    count: usize,
    phases: SmallVec<[PhasePlan; 2]>,
    phase: usize,
    state: PhaseState,
    /// Latest interpolated values; the `from` of any interrupting request.
    current: Attributes,
    on_complete: Completion,
}

#[derive(Debug, Clone, Copy, Default)]
struct HandleProgress {
    remaining: usize,
    completed: usize,
    interrupted: usize,
}

/// Tick-driven interpolation of element attributes.
///
/// The scheduler owns no elements. Each [`tick`](Self::tick) reports attribute
/// writes and completed removals for the caller to apply, so removal always
/// happens after the exit animation has run to the end.
#[derive(Debug, Default)]
pub struct TransitionScheduler {
    now_ms: f64,
    timelines: IndexMap<ElementId, Timeline>,
    handles: HashMap<TransitionHandle, HandleProgress>,
    finished_order: VecDeque<TransitionHandle>,
    newly_finished: Vec<TransitionHandle>,
    next_handle: u64,
}

impl TransitionScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock value of the latest tick.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.timelines.len()
    }

    #[must_use]
    pub fn is_animating(&self, element: ElementId) -> bool {
        self.timelines.contains_key(&element)
    }

    #[must_use]
    pub fn phase_of(&self, element: ElementId) -> Option<ElementPhase> {
        self.timelines
            .get(&element)
            .map(|timeline| match timeline.state {
                PhaseState::Pending { .. } => ElementPhase::Pending {
                    phase: timeline.phase,
                },
                PhaseState::Animating { .. } => ElementPhase::Animating {
                    phase: timeline.phase,
                },
            })
    }

    /// `true` when `element` is animating towards removal.
    #[must_use]
    pub fn is_removing(&self, element: ElementId) -> bool {
        self.timelines
            .get(&element)
            .is_some_and(|timeline| timeline.on_complete == Completion::Remove)
    }

    #[must_use]
    pub fn status(&self, handle: TransitionHandle) -> HandleStatus {
        match self.handles.get(&handle) {
            Some(progress) if progress.remaining > 0 => HandleStatus::Running {
                remaining: progress.remaining,
            },
            Some(progress) => HandleStatus::Finished {
                completed: progress.completed,
                interrupted: progress.interrupted,
            },
            None => HandleStatus::Unknown,
        }
    }

    /// Schedules `requests` starting at the current clock.
    ///
    /// An element that is still animating is interrupted: its pending phases
    /// (including a pending removal) are dropped and its current interpolated
    /// values become the new starting point.
    pub fn animate(&mut self, requests: Vec<AnimationRequest>) -> ChartResult<TransitionHandle> {
        for request in &requests {
            for phase in &request.phases {
                phase.spec.validate()?;
            }
        }

        let handle = TransitionHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(
            handle,
            HandleProgress {
                remaining: requests.len(),
                ..HandleProgress::default()
            },
        );
        if requests.is_empty() {
            self.mark_finished(handle);
            return Ok(handle);
        }

        for request in requests {
            let mut current = request.from;
            let interrupted = self
                .timelines
                .get(&request.element)
                .map(|timeline| (timeline.handle, timeline.current.clone()));
            if let Some((previous_handle, interpolated)) = interrupted {
                debug!(element = %request.element, "interrupting in-flight transition");
                current.merge(&interpolated);
                self.record_outcome(previous_handle, true);
            }

            let starts_at = self.now_ms
                + request.phases.first().map_or(0.0, |phase| {
                    phase.spec.delay.delay_ms(request.index, request.count)
                });
            self.timelines.insert(
                request.element,
                Timeline {
                    handle,
                    index: request.index,
                    count: request.count,
                    phases: request.phases,
                    phase: 0,
                    state: PhaseState::Pending { starts_at },
                    current,
                    on_complete: request.on_complete,
                },
            );
        }

        trace!(
            handle = handle.0,
            active = self.timelines.len(),
            "transition scheduled"
        );
        Ok(handle)
    }

    /// Advances every timeline to `now_ms`.
    ///
    /// The clock never moves backwards; earlier or non-finite values re-evaluate
    /// the current instant.
    pub fn tick(&mut self, now_ms: f64) -> TickOutput {
        if now_ms.is_finite() && now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
        let now = self.now_ms;

        let mut output = TickOutput::default();
        let mut finished = Vec::new();
        for (id, timeline) in &mut self.timelines {
            if advance(*id, timeline, now, &mut output.writes) {
                finished.push(*id);
            }
        }

        for id in finished {
            if let Some(timeline) = self.timelines.shift_remove(&id) {
                output.completed.push(id);
                if timeline.on_complete == Completion::Remove {
                    output.removals.push(id);
                }
                self.record_outcome(timeline.handle, false);
            }
        }

        output.finished = std::mem::take(&mut self.newly_finished);
        output
    }

    /// Stops every element scheduled through `handle` at its current values.
    ///
    /// Returns the affected elements; pending removals are dropped with them.
    pub fn cancel(&mut self, handle: TransitionHandle) -> Vec<ElementId> {
        let elements: Vec<ElementId> = self
            .timelines
            .iter()
            .filter(|(_, timeline)| timeline.handle == handle)
            .map(|(id, _)| *id)
            .collect();
        for id in &elements {
            self.timelines.shift_remove(id);
            self.record_outcome(handle, true);
        }
        elements
    }

    /// Stops one element and returns its current interpolated values.
    pub fn cancel_element(&mut self, element: ElementId) -> Option<Attributes> {
        let timeline = self.timelines.shift_remove(&element)?;
        self.record_outcome(timeline.handle, true);
        Some(timeline.current)
    }

    /// Abandons every in-flight timeline without emitting writes or removals.
    pub fn abandon_all(&mut self) -> usize {
        let abandoned: Vec<(ElementId, TransitionHandle)> = self
            .timelines
            .iter()
            .map(|(id, timeline)| (*id, timeline.handle))
            .collect();
        for (id, handle) in &abandoned {
            self.timelines.shift_remove(id);
            self.record_outcome(*handle, true);
        }
        abandoned.len()
    }

    fn record_outcome(&mut self, handle: TransitionHandle, interrupted: bool) {
        let Some(progress) = self.handles.get_mut(&handle) else {
            return;
        };
        if progress.remaining == 0 {
            return;
        }
        progress.remaining -= 1;
        if interrupted {
            progress.interrupted += 1;
        } else {
            progress.completed += 1;
        }
        if progress.remaining == 0 {
            self.mark_finished(handle);
        }
    }

    fn mark_finished(&mut self, handle: TransitionHandle) {
        self.newly_finished.push(handle);
        self.finished_order.push_back(handle);
        while self.finished_order.len() > FINISHED_HANDLE_HISTORY {
            if let Some(evicted) = self.finished_order.pop_front() {
                self.handles.remove(&evicted);
            }
        }
    }
}

/// Moves one timeline forward to `now`. Returns `true` once its last phase ends.
fn advance(
    id: ElementId,
    timeline: &mut Timeline,
    now: f64,
    writes: &mut Vec<AttrWrite>,
) -> bool {
    loop {
        let Some(plan) = timeline.phases.get(timeline.phase) else {
            return true;
        };

        let next_state = match &timeline.state {
            PhaseState::Pending { starts_at } => {
                if now < *starts_at {
                    return false;
                }
                for (name, value) in plan.on_start.iter() {
                    if value.is_finite() {
                        commit(id, &mut timeline.current, name, value.clone(), writes);
                    }
                }
                let mut from = Attributes::new();
                for (name, to) in plan.targets.iter() {
                    from.set(name, timeline.current.get(name).unwrap_or(to).clone());
                }
                PhaseState::Animating {
                    started_at: *starts_at,
                    from,
                }
            }
            PhaseState::Animating { started_at, from } => {
                let spec = &plan.spec;
                let duration = spec.duration_ms;
                let progress = if duration <= 0.0 {
                    1.0
                } else {
                    ((now - started_at) / duration).clamp(0.0, 1.0)
                };
                let eased = if progress >= 1.0 {
                    1.0
                } else {
                    spec.easing.apply(progress)
                };

                for (name, to) in plan.targets.iter() {
                    let start = from.get(name).unwrap_or(to);
                    // A `None` keeps the last valid committed value for this tick.
                    if let Some(value) = spec.interpolate(name, start, to, eased) {
                        commit(id, &mut timeline.current, name, value, writes);
                    }
                }
                if progress < 1.0 {
                    return false;
                }

                let ended_at = started_at + duration;
                timeline.phase += 1;
                match timeline.phases.get(timeline.phase) {
                    Some(next) => PhaseState::Pending {
                        starts_at: ended_at
                            + next.spec.delay.delay_ms(timeline.index, timeline.count),
                    },
                    None => return true,
                }
            }
        };
        timeline.state = next_state;
    }
}

fn commit(
    id: ElementId,
    current: &mut Attributes,
    name: &str,
    value: AttrValue,
    writes: &mut Vec<AttrWrite>,
) {
    if current.get(name) == Some(&value) {
        return;
    }
    current.set(name, value.clone());
    writes.push(AttrWrite {
        element: id,
        name: name.to_owned(),
        value,
    });
}
