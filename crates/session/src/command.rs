use compute::report::RecommendationTable;
use compute::simulation::PanelInputs;
use foundation::ids::LayerId;
use layers::layer::LayerDescriptor;
use layers::selection::DrawEvent;
use serde::{Deserialize, Serialize};

/// Attribute selector change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeChangeEvent {
    pub attribute_key: String,
}

/// Discrete user or loader action applied by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replaces the registry; the previous selection is discarded.
    Load(Vec<LayerDescriptor>),
    Toggle(LayerId),
    SelectAttribute(AttributeChangeEvent),
    Draw(DrawEvent),
    ClearSelection,
    SetRecommendations(RecommendationTable),
    SetPanels(PanelInputs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Load(_) => "load",
            Command::Toggle(_) => "toggle",
            Command::SelectAttribute(_) => "select_attribute",
            Command::Draw(_) => "draw",
            Command::ClearSelection => "clear_selection",
            Command::SetRecommendations(_) => "set_recommendations",
            Command::SetPanels(_) => "set_panels",
        }
    }

    pub fn toggle(id: impl Into<LayerId>) -> Self {
        Command::Toggle(id.into())
    }

    pub fn select_attribute(key: impl Into<String>) -> Self {
        Command::SelectAttribute(AttributeChangeEvent {
            attribute_key: key.into(),
        })
    }
}
