use std::collections::HashSet;
use std::sync::Arc;

use foundation::ids::LayerId;
use tracing::{debug, info, warn};

use crate::catalog::derive_attributes;
use crate::config::LayersConfig;
use crate::layer::{Layer, LayerDescriptor};

/// Ordered collection of registered layers; the single source of truth for
/// visibility.
///
/// Ordering contract:
/// - Layers keep descriptor order; selection results and reports follow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
    base: Option<LayerId>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptors` and establishes the initial visibility state:
    /// the base choropleth visible, every other choropleth hidden, auxiliary
    /// layers as their descriptor says (hidden by default).
    pub fn load(
        descriptors: impl IntoIterator<Item = LayerDescriptor>,
        config: &LayersConfig,
    ) -> Self {
        let mut seen: HashSet<LayerId> = HashSet::new();
        let mut layers: Vec<Layer> = Vec::new();

        for d in descriptors {
            if !config.accepts_dataset(d.dataset.as_deref()) {
                debug!(layer = %d.id, dataset = ?d.dataset, "layer outside dataset context");
                continue;
            }
            if !seen.insert(d.id.clone()) {
                warn!(layer = %d.id, "duplicate layer id, keeping the first");
                continue;
            }

            let attributes = if d.kind.is_choropleth() {
                d.attributes
                    .unwrap_or_else(|| derive_attributes(&d.features, config))
            } else {
                Vec::new()
            };

            layers.push(Layer {
                id: d.id,
                name: d.name,
                kind: d.kind,
                visible: d.visible.unwrap_or(false),
                features: Arc::from(d.features),
                attributes,
            });
        }

        let base = pick_base(&layers, config);
        for layer in layers.iter_mut().filter(|l| l.is_choropleth()) {
            layer.visible = Some(&layer.id) == base.as_ref();
        }

        info!(
            layers = layers.len(),
            base = ?base.as_ref().map(LayerId::as_str),
            "layer registry loaded"
        );
        Self { layers, base }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| &l.id == id)
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn base_id(&self) -> Option<&LayerId> {
        self.base.as_ref()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter().filter(|l| l.visible)
    }

    /// Visible layer ids in registry order, as handed to the renderer.
    pub fn visible_ids(&self) -> Vec<LayerId> {
        self.visible().map(|l| l.id.clone()).collect()
    }

    /// The choropleth currently driving the color scale, if any.
    pub fn active_choropleth(&self) -> Option<&Layer> {
        self.visible().find(|l| l.is_choropleth())
    }

    pub fn visible_choropleth_count(&self) -> usize {
        self.visible().filter(|l| l.is_choropleth()).count()
    }

    pub fn feature_count(&self) -> usize {
        self.layers.iter().map(|l| l.features.len()).sum()
    }
}

fn pick_base(layers: &[Layer], config: &LayersConfig) -> Option<LayerId> {
    let mut choropleths = layers.iter().filter(|l| l.is_choropleth());
    if let Some(wanted) = &config.base_layer_id {
        if let Some(found) = layers.iter().find(|l| l.is_choropleth() && &l.id == wanted) {
            return Some(found.id.clone());
        }
        warn!(layer = %wanted, "configured base layer not registered, using first choropleth");
    }
    choropleths.next().map(|l| l.id.clone())
}
