use std::sync::Arc;

use compute::aggregate::aggregate;
use compute::report::build_report;
use layers::catalog::resolve_selected_attribute;
use layers::registry::LayerRegistry;
use layers::selection::{BoundsPrefilter, SelectionOutcome, SpatialSelector};
use layers::symbology::compute_domain;
use layers::visibility::{VisibilityChange, toggle};
use runtime::cycle::Cycle;
use runtime::event_bus::{Event, EventBus, EventKind};
use runtime::metrics::Metrics;
use scene::geometry::Geometry;
use tracing::{debug, info};

use crate::command::Command;
use crate::config::EngineConfig;
use crate::state::AppState;

/// Owns the current [`AppState`] and applies commands to it.
///
/// Recomputation order per command:
/// - load / toggle: visibility, attributes, domain
/// - attribute change: attributes, domain
/// - draw / clear: selection, aggregation, report
///
/// A load also clears the selection since its layers are gone.
pub struct Controller {
    config: EngineConfig,
    selector: SpatialSelector<BoundsPrefilter>,
    state: Arc<AppState>,
    events: EventBus,
    metrics: Metrics,
}

impl Controller {
    pub fn new(config: EngineConfig) -> Self {
        let state = AppState {
            panels: config.panels,
            ..AppState::default()
        };
        Self {
            config,
            selector: SpatialSelector::with_candidates(BoundsPrefilter),
            state: Arc::new(state),
            events: EventBus::new(),
            metrics: Metrics::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Shared handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Takes the retained stage events, leaving the trace empty.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Applies `command` and returns the new snapshot. Never fails; problems
    /// are logged, counted, and leave a reduced state behind.
    pub fn apply(&mut self, command: Command) -> Arc<AppState> {
        let cycle = self.state.cycle.next();
        let mut next = AppState::clone(&self.state);
        next.cycle = cycle;
        self.metrics.inc_counter(format!("command.{}", command.name()), 1);
        debug!(cycle = cycle.index, command = command.name(), "applying command");

        match command {
            Command::Load(descriptors) => {
                next.registry = LayerRegistry::load(descriptors, &self.config.layers);
                self.events.emit(
                    cycle,
                    EventKind::Load,
                    format!("{} layers registered", next.registry.len()),
                );
                self.emit_visibility(cycle, &next);
                self.refresh_attribute(cycle, &mut next, None);
                self.refresh_domain(cycle, &mut next);
                self.run_selection(cycle, &mut next, None);
                self.run_aggregation(cycle, &mut next);
                self.run_report(cycle, &mut next);
            }
            Command::Toggle(id) => {
                let (registry, change) = toggle(&next.registry, &id);
                next.registry = registry;
                if change == VisibilityChange::Ignored {
                    self.events
                        .emit(cycle, EventKind::Visibility, format!("unknown layer {id}"));
                } else {
                    self.emit_visibility(cycle, &next);
                    let previous = next.selected_attribute.take();
                    self.refresh_attribute(cycle, &mut next, previous);
                    self.refresh_domain(cycle, &mut next);
                }
            }
            Command::SelectAttribute(event) => {
                if next
                    .active_layer()
                    .is_some_and(|l| !l.has_attribute(&event.attribute_key))
                {
                    debug!(attribute = %event.attribute_key, "attribute not offered by active layer");
                }
                next.selected_attribute = Some(event.attribute_key);
                self.events.emit(
                    cycle,
                    EventKind::Attribute,
                    format!("selected {:?}", next.selected_attribute),
                );
                self.refresh_domain(cycle, &mut next);
            }
            Command::Draw(event) => {
                self.run_selection(cycle, &mut next, Some(&event.geometry));
                self.run_aggregation(cycle, &mut next);
                self.run_report(cycle, &mut next);
            }
            Command::ClearSelection => {
                self.run_selection(cycle, &mut next, None);
                self.run_aggregation(cycle, &mut next);
                self.run_report(cycle, &mut next);
            }
            Command::SetRecommendations(table) => {
                next.recommendations = table;
                self.run_report(cycle, &mut next);
            }
            Command::SetPanels(panels) => {
                next.panels = panels;
                self.run_report(cycle, &mut next);
            }
        }

        self.state = Arc::new(next);
        self.snapshot()
    }

    fn emit_visibility(&mut self, cycle: Cycle, next: &AppState) {
        let visible = next.visible_layer_ids();
        let names: Vec<&str> = visible.iter().map(|id| id.as_str()).collect();
        self.events
            .emit(cycle, EventKind::Visibility, format!("visible: {}", names.join(",")));
    }

    fn refresh_attribute(&mut self, cycle: Cycle, next: &mut AppState, previous: Option<String>) {
        next.selected_attribute =
            resolve_selected_attribute(next.registry.active_choropleth(), previous.as_deref());
        self.events.emit(
            cycle,
            EventKind::Attribute,
            format!("selected {:?}", next.selected_attribute),
        );
    }

    fn refresh_domain(&mut self, cycle: Cycle, next: &mut AppState) {
        next.domain = compute_domain(
            next.registry.active_choropleth(),
            next.selected_attribute.as_deref(),
        );
        self.events.emit(
            cycle,
            EventKind::Domain,
            format!("[{}, {}]", next.domain.min, next.domain.max),
        );
    }

    fn run_selection(&mut self, cycle: Cycle, next: &mut AppState, drawn: Option<&Geometry>) {
        let outcome = match drawn {
            Some(geometry) => {
                let outcome = self.selector.select(next.registry.layers(), geometry);
                self.record_selection(&outcome);
                outcome
            }
            None => SelectionOutcome::default(),
        };
        next.selection = outcome.result;
        next.selection_stats = outcome.stats;
        self.events.emit(
            cycle,
            EventKind::Selection,
            format!(
                "{} layers, {} features",
                next.selection.len(),
                next.selection.feature_count()
            ),
        );
    }

    fn record_selection(&mut self, outcome: &SelectionOutcome) {
        let s = &outcome.stats;
        self.metrics.inc_counter("selection.draws", 1);
        if outcome.rejected.is_some() {
            self.metrics.inc_counter("selection.invalid_input", 1);
        }
        self.metrics
            .inc_counter("selection.geometry_errors", s.geometry_errors as u64);
        self.metrics
            .inc_counter("selection.data_shape_errors", s.data_shape_errors as u64);
        self.metrics.inc_counter(
            "selection.unsupported_geometries",
            s.unsupported_geometries as u64,
        );
        self.metrics
            .observe("selection.features_tested", s.features_tested as u64);
        self.metrics
            .observe("selection.features_matched", s.features_matched as u64);
    }

    fn run_aggregation(&mut self, cycle: Cycle, next: &mut AppState) {
        next.aggregates = aggregate(&next.selection, &next.registry, &self.config.aggregation);
        self.events.emit(
            cycle,
            EventKind::Aggregation,
            format!("{} records", next.aggregates.records.len()),
        );
    }

    fn run_report(&mut self, cycle: Cycle, next: &mut AppState) {
        next.report = build_report(
            &next.aggregates,
            &next.recommendations,
            &next.panels,
            &self.config.aggregation,
        );
        if let Some(d) = &next.report.diagnosis {
            info!(category = %d.category, location = %d.location, "diagnosis found");
        }
        self.events.emit(
            cycle,
            EventKind::Report,
            format!("{} charts", next.report.charts.len()),
        );
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
