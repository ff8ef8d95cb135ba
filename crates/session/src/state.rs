use compute::aggregate::AggregateReport;
use compute::report::{RecommendationTable, Report};
use compute::simulation::PanelInputs;
use foundation::ids::LayerId;
use layers::layer::{AttributeDescriptor, Layer};
use layers::registry::LayerRegistry;
use layers::selection::{SelectionResult, SelectionStats};
use layers::symbology::{AttributeDomain, ColorScale, Legend};
use runtime::cycle::Cycle;

/// Immutable application snapshot. The controller replaces it wholesale on
/// every command; readers holding an older snapshot keep a consistent view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Cycle of the command that produced this snapshot.
    pub cycle: Cycle,
    pub registry: LayerRegistry,
    pub selected_attribute: Option<String>,
    pub domain: AttributeDomain,
    pub selection: SelectionResult,
    pub selection_stats: SelectionStats,
    pub aggregates: AggregateReport,
    pub report: Report,
    pub recommendations: RecommendationTable,
    pub panels: PanelInputs,
}

impl AppState {
    pub fn visible_layer_ids(&self) -> Vec<LayerId> {
        self.registry.visible_ids()
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.registry.active_choropleth()
    }

    /// Attributes offered by the active choropleth.
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        self.active_layer()
            .map(|l| l.attributes.as_slice())
            .unwrap_or_default()
    }

    pub fn color_scale(&self) -> ColorScale {
        ColorScale::new(self.domain)
    }

    pub fn legend(&self) -> Option<Legend> {
        self.color_scale().legend()
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }
}
