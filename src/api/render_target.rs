use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::animation::{AnimationRequest, PhasePlan, TransitionHandle, TransitionScheduler};
use crate::api::{AxisModel, AxisRenderer, ChartConfig, ChartLayout, PhaseTemplate};
use crate::core::{DatasetJoiner, JoinResult, Key, Record, ensure_shape};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{ChartObserver, ObserverContext, RenderEvent};
use crate::render::{
    Attributes, ElementId, ElementLifecycle, MarkKind, Surface, VisualElement,
};

/// Lifecycle of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    Uninitialized,
    Initialized,
}

impl TargetState {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
        }
    }
}

/// Outcome of one `initialize` or `update` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinSummary {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
    /// Updated keys whose elements were animating out and got reused.
    pub revived: usize,
    /// Transition moving entering and updated elements, when one was started.
    pub transition: Option<TransitionHandle>,
    /// Transition moving exiting elements towards removal.
    pub exit_transition: Option<TransitionHandle>,
}

/// Outcome of one `tick` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    pub writes: usize,
    pub removed: Vec<Key>,
    pub surface_errors: usize,
    pub finished: Vec<TransitionHandle>,
}

/// Owns the rendered elements of one chart instance.
///
/// Every surface mutation goes through `initialize`, `update`, `tick` or
/// `teardown`. Removal of exiting elements happens only inside `tick`, once
/// the scheduler reports their exit animation as finished.
pub struct RenderTarget<L: ChartLayout, S: Surface> {
    layout: L,
    surface: S,
    config: ChartConfig,
    state: TargetState,
    elements: IndexMap<Key, VisualElement>,
    keys_by_id: HashMap<ElementId, Key>,
    scheduler: TransitionScheduler,
    next_id: u64,
    scales: Option<L::Scales>,
    axes: Vec<AxisModel>,
    axis_renderer: Option<Box<dyn AxisRenderer>>,
    observers: Vec<Box<dyn ChartObserver>>,
}

impl<L: ChartLayout, S: Surface> RenderTarget<L, S> {
    pub fn new(layout: L, surface: S, config: ChartConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            layout,
            surface,
            config,
            state: TargetState::Uninitialized,
            elements: IndexMap::new(),
            keys_by_id: HashMap::new(),
            scheduler: TransitionScheduler::new(),
            next_id: 1,
            scales: None,
            axes: Vec::new(),
            axis_renderer: None,
            observers: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_axis_renderer(mut self, renderer: Box<dyn AxisRenderer>) -> Self {
        self.axis_renderer = Some(renderer);
        self
    }

    pub fn set_axis_renderer(&mut self, renderer: Option<Box<dyn AxisRenderer>>) {
        self.axis_renderer = renderer;
    }

    #[must_use]
    pub fn state(&self) -> TargetState {
        self.state
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state == TargetState::Initialized
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &L {
        &self.layout
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn scheduler(&self) -> &TransitionScheduler {
        &self.scheduler
    }

    /// Scales built from the latest snapshot.
    #[must_use]
    pub fn scales(&self) -> Option<&L::Scales> {
        self.scales.as_ref()
    }

    /// Axes computed from the latest scales.
    #[must_use]
    pub fn axes(&self) -> &[AxisModel] {
        &self.axes
    }

    /// Every owned element, including ones still animating out.
    pub fn elements(&self) -> impl Iterator<Item = &VisualElement> {
        self.elements.values()
    }

    #[must_use]
    pub fn element(&self, key: &Key) -> Option<&VisualElement> {
        self.elements.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.elements
            .values()
            .filter(|element| !element.is_exiting())
            .count()
    }

    /// Registers an observer. Ids must be non-empty and unique.
    pub fn register_observer(&mut self, observer: Box<dyn ChartObserver>) -> ChartResult<()> {
        let observer_id = observer.id().to_owned();
        if observer_id.is_empty() {
            return Err(ChartError::InvalidData(
                "observer id must not be empty".to_owned(),
            ));
        }
        if self.observers.iter().any(|entry| entry.id() == observer_id) {
            return Err(ChartError::InvalidData(format!(
                "observer with id `{observer_id}` is already registered"
            )));
        }
        self.observers.push(observer);
        Ok(())
    }

    /// Unregisters an observer by id. Returns `true` when removed.
    pub fn unregister_observer(&mut self, observer_id: &str) -> bool {
        if let Some(position) = self
            .observers
            .iter()
            .position(|entry| entry.id() == observer_id)
        {
            self.observers.remove(position);
            return true;
        }
        false
    }

    /// First draw: one element per record, committed at its target attributes.
    ///
    /// With `animate_initial_entry`, elements start at their entering
    /// attributes and animate in instead.
    pub fn initialize(&mut self, records: &[Record]) -> ChartResult<JoinSummary> {
        if self.state != TargetState::Uninitialized {
            return Err(ChartError::InvalidState {
                expected: TargetState::Uninitialized.name(),
                actual: self.state.name(),
            });
        }

        let (scales, join) = self.prepare(records)?;
        let animate = self.config.animate_initial_entry;
        let phases = self.layout.update_phases(&scales, &self.config);
        validate_phases(&phases)?;
        self.publish_axes(&scales);
        let initial = if animate {
            self.layout.entering(&scales, &self.config)
        } else {
            self.layout.target(&scales, &self.config)
        };

        let mut events = Vec::new();
        let mut requests = Vec::new();
        let count = records.len();
        let mark = self.layout.mark();
        for entry in join.enter {
            let attributes = initial.resolve(&entry.record, entry.index);
            let Some(id) = self.create_element(
                mark,
                entry.key,
                entry.record,
                entry.index,
                attributes.clone(),
                &mut events,
            ) else {
                continue;
            };
            if animate {
                requests.push(build_request(
                    id,
                    attributes,
                    &phases,
                    &entry.record,
                    entry.index,
                    count,
                ));
            }
        }

        let transition = if requests.is_empty() {
            None
        } else {
            Some(self.scheduler.animate(requests)?)
        };

        self.scales = Some(scales);
        self.state = TargetState::Initialized;
        debug!(elements = self.elements.len(), "render target initialized");
        events.insert(
            0,
            RenderEvent::Initialized {
                elements: self.elements.len(),
            },
        );
        self.dispatch(events);

        Ok(JoinSummary {
            entered: self.elements.len(),
            transition,
            ..JoinSummary::default()
        })
    }

    /// Redraw against a new snapshot.
    ///
    /// Entering elements are created at their entering attributes first, then
    /// entering and updated elements animate to their new targets together,
    /// then exiting elements start animating towards removal.
    pub fn update(&mut self, records: &[Record]) -> ChartResult<JoinSummary> {
        if self.state != TargetState::Initialized {
            return Err(ChartError::InvalidState {
                expected: TargetState::Initialized.name(),
                actual: self.state.name(),
            });
        }

        let (scales, join) = self.prepare(records)?;
        let phases = self.layout.update_phases(&scales, &self.config);
        validate_phases(&phases)?;
        let exit_spec = Rc::new(self.layout.exit_transition(&self.config));
        exit_spec.validate()?;
        self.publish_axes(&scales);
        let entering = self.layout.entering(&scales, &self.config);
        let exiting = self.layout.exiting(&scales, &self.config);

        let mut summary = JoinSummary::default();
        let mut events = Vec::new();
        let count = records.len();
        let mark = self.layout.mark();

        let mut entered = Vec::with_capacity(join.enter.len());
        for entry in join.enter {
            let attributes = entering.resolve(&entry.record, entry.index);
            if let Some(id) = self.create_element(
                mark,
                entry.key,
                entry.record,
                entry.index,
                attributes.clone(),
                &mut events,
            ) {
                entered.push((id, attributes, entry.record, entry.index));
            }
        }
        summary.entered = entered.len();

        let mut requests: Vec<AnimationRequest> = entered
            .into_iter()
            .map(|(id, from, record, index)| {
                build_request(id, from, &phases, &record, index, count)
            })
            .collect();

        for entry in join.update {
            let Some(element) = self.elements.get_mut(&entry.key) else {
                continue;
            };
            if element.is_exiting() {
                element.lifecycle = ElementLifecycle::Live;
                summary.revived += 1;
                debug!(key = %entry.key, element = %element.id, "reviving exiting element");
                events.push(RenderEvent::ElementRevived {
                    element: element.id,
                    key: entry.key.clone(),
                });
            }
            element.record = entry.record;
            element.index = entry.index;
            requests.push(build_request(
                element.id,
                committed_from(&self.surface, element),
                &phases,
                &entry.record,
                entry.index,
                count,
            ));
            summary.updated += 1;
        }

        if !requests.is_empty() {
            summary.transition = Some(self.scheduler.animate(requests)?);
        }

        let mut exit_requests = Vec::new();
        for entry in join.exit {
            let Some(element) = self.elements.get_mut(&entry.key) else {
                continue;
            };
            if element.is_exiting() {
                continue;
            }
            element.lifecycle = ElementLifecycle::Exiting;
            let targets = exiting.resolve(&element.record, element.index);
            exit_requests.push(
                AnimationRequest::new(element.id, committed_from(&self.surface, element))
                    .then(PhasePlan::new(Rc::clone(&exit_spec), targets))
                    .removing(),
            );
        }
        summary.exited = exit_requests.len();
        if !exit_requests.is_empty() {
            summary.exit_transition = Some(self.scheduler.animate(exit_requests)?);
        }

        self.scales = Some(scales);
        debug!(
            entered = summary.entered,
            updated = summary.updated,
            exited = summary.exited,
            revived = summary.revived,
            "render target updated"
        );
        events.insert(
            0,
            RenderEvent::Updated {
                entered: summary.entered,
                updated: summary.updated,
                exited: summary.exited,
                revived: summary.revived,
            },
        );
        self.dispatch(events);
        Ok(summary)
    }

    /// Advances animations to `now_ms` and applies their writes and removals.
    ///
    /// A surface failure only affects the element it was reported for.
    pub fn tick(&mut self, now_ms: f64) -> TickSummary {
        let output = self.scheduler.tick(now_ms);
        let mut summary = TickSummary {
            finished: output.finished,
            ..TickSummary::default()
        };
        let mut events = Vec::new();

        for write in output.writes {
            let Some(element) = self
                .keys_by_id
                .get(&write.element)
                .and_then(|key| self.elements.get_mut(key))
            else {
                continue;
            };
            match self
                .surface
                .set_attribute(write.element, &write.name, &write.value)
            {
                Ok(()) => {
                    element.attributes.set(write.name, write.value);
                    summary.writes += 1;
                }
                Err(err) => {
                    warn!(element = %write.element, error = %err, "surface rejected attribute write");
                    summary.surface_errors += 1;
                    events.push(RenderEvent::SurfaceError {
                        element: write.element,
                        reason: err.to_string(),
                    });
                }
            }
        }

        for id in output.removals {
            if let Some(key) = self.remove_element(id, &mut events, &mut summary.surface_errors) {
                summary.removed.push(key);
            }
        }

        trace!(
            now_ms = self.scheduler.now_ms(),
            writes = summary.writes,
            removed = summary.removed.len(),
            "render target ticked"
        );
        self.dispatch(events);
        summary
    }

    /// Abandons in-flight transitions and drops elements that were animating out.
    ///
    /// Returns the number of abandoned transitions. Live elements stay on the
    /// surface at their last committed values.
    pub fn teardown(&mut self) -> usize {
        let abandoned = self.scheduler.abandon_all();
        let exiting: Vec<ElementId> = self
            .elements
            .values()
            .filter(|element| element.is_exiting())
            .map(|element| element.id)
            .collect();

        let mut events = Vec::new();
        let mut errors = 0;
        for id in exiting {
            self.remove_element(id, &mut events, &mut errors);
        }
        debug!(abandoned, "render target torn down");
        events.push(RenderEvent::TornDown {
            abandoned_transitions: abandoned,
        });
        self.dispatch(events);
        abandoned
    }

    fn prepare(&self, records: &[Record]) -> ChartResult<(L::Scales, JoinResult)> {
        ensure_shape(records, self.layout.shape())?;
        let scales = self.layout.scales(records, &self.config)?;
        let keys = self.layout.keys(records);
        let join = DatasetJoiner::join(&self.elements, records, |_, index| {
            keys.get(index).cloned().unwrap_or(Key::Index(index))
        })?;
        trace!(records = records.len(), "scales rebuilt");
        Ok((scales, join))
    }

    /// Recomputes the axes and hands them to the axis renderer.
    ///
    /// Runs only once a snapshot can no longer be rejected.
    fn publish_axes(&mut self, scales: &L::Scales) {
        self.axes = self.layout.axes(scales, &self.config);
        if let Some(renderer) = self.axis_renderer.as_mut() {
            for axis in &self.axes {
                if let Err(err) = renderer.render_axis(axis) {
                    warn!(orientation = ?axis.orientation, error = %err, "axis renderer failed");
                }
            }
        }
        trace!(axes = self.axes.len(), "axes published");
    }

    fn create_element(
        &mut self,
        mark: MarkKind,
        key: Key,
        record: Record,
        index: usize,
        mut attributes: Attributes,
        events: &mut Vec<RenderEvent>,
    ) -> Option<ElementId> {
        let id = ElementId(self.next_id);
        self.next_id += 1;

        let dropped = attributes.retain_finite();
        if !dropped.is_empty() {
            warn!(element = %id, ?dropped, "dropping non-finite attributes on create");
        }
        if let Err(err) = self.surface.create(id, mark, &attributes) {
            warn!(element = %id, %key, error = %err, "surface rejected element");
            events.push(RenderEvent::SurfaceError {
                element: id,
                reason: err.to_string(),
            });
            return None;
        }

        trace!(element = %id, %key, "element created");
        self.keys_by_id.insert(id, key.clone());
        self.elements.insert(
            key.clone(),
            VisualElement {
                id,
                key,
                record,
                index,
                attributes,
                lifecycle: ElementLifecycle::Live,
            },
        );
        Some(id)
    }

    fn remove_element(
        &mut self,
        id: ElementId,
        events: &mut Vec<RenderEvent>,
        errors: &mut usize,
    ) -> Option<Key> {
        let key = self.keys_by_id.remove(&id)?;
        self.elements.shift_remove(&key);
        if let Err(err) = self.surface.remove(id) {
            warn!(element = %id, error = %err, "surface rejected removal");
            *errors += 1;
            events.push(RenderEvent::SurfaceError {
                element: id,
                reason: err.to_string(),
            });
        }
        trace!(element = %id, %key, "element removed");
        events.push(RenderEvent::ElementRemoved {
            element: id,
            key: key.clone(),
        });
        Some(key)
    }

    fn dispatch(&mut self, events: Vec<RenderEvent>) {
        if self.observers.is_empty() || events.is_empty() {
            return;
        }
        let context = ObserverContext {
            now_ms: self.scheduler.now_ms(),
            live_elements: self.live_count(),
            exiting_elements: self.elements.len() - self.live_count(),
            active_transitions: self.scheduler.active_count(),
        };
        for event in &events {
            for observer in &mut self.observers {
                observer.on_event(event, context);
            }
        }
    }
}

/// Committed values of `element`, preferring what the surface reports.
fn committed_from<S: Surface>(surface: &S, element: &VisualElement) -> Attributes {
    element
        .attributes
        .iter()
        .map(|(name, value)| {
            let committed = surface
                .committed(element.id, name)
                .unwrap_or_else(|| value.clone());
            (name, committed)
        })
        .collect()
}

fn validate_phases(phases: &[PhaseTemplate]) -> ChartResult<()> {
    for phase in phases {
        phase.spec.validate()?;
    }
    Ok(())
}

fn build_request(
    id: ElementId,
    from: Attributes,
    phases: &[PhaseTemplate],
    record: &Record,
    index: usize,
    count: usize,
) -> AnimationRequest {
    phases.iter().fold(
        AnimationRequest::new(id, from).at(index, count),
        |request, phase| request.then(phase.resolve(record, index)),
    )
}
