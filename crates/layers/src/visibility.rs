use foundation::ids::LayerId;
use tracing::debug;

use crate::registry::LayerRegistry;

/// What a toggle did to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityChange {
    /// Unknown layer id; nothing changed.
    Ignored,
    /// The layer flipped to `visible`; `hidden` lists choropleths switched off
    /// to keep them mutually exclusive.
    Toggled {
        layer: LayerId,
        visible: bool,
        hidden: Vec<LayerId>,
    },
}

/// Applies `toggle(id)` and returns the next registry snapshot.
///
/// Rules:
/// - Non-choropleth layer: flip only its own flag.
/// - Choropleth turning on: every other choropleth turns off.
/// - Choropleth turning off: flip only its own flag.
pub fn toggle(registry: &LayerRegistry, id: &LayerId) -> (LayerRegistry, VisibilityChange) {
    let mut next = registry.clone();

    let Some(layer) = next.get_mut(id) else {
        debug!(layer = %id, "toggle for unknown layer ignored");
        return (next, VisibilityChange::Ignored);
    };
    layer.visible = !layer.visible;
    let visible = layer.visible;
    let exclusive = layer.is_choropleth() && visible;

    let mut hidden = Vec::new();
    if exclusive {
        for other in next.layers_mut() {
            if other.is_choropleth() && &other.id != id && other.visible {
                other.visible = false;
                hidden.push(other.id.clone());
            }
        }
    }

    debug_assert!(
        next.visible_choropleth_count() <= 1,
        "more than one choropleth visible after toggle"
    );
    debug!(layer = %id, visible, hidden = hidden.len(), "layer toggled");

    let change = VisibilityChange::Toggled {
        layer: id.clone(),
        visible,
        hidden,
    };
    (next, change)
}
