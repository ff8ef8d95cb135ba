use std::sync::Arc;

use foundation::ids::LayerId;
use scene::feature::Feature;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Polygon layer colored by a numeric attribute.
    Choropleth,
    #[serde(alias = "point_icon", alias = "point_circle")]
    Point,
    #[serde(alias = "geojson")]
    Boundary,
}

impl LayerKind {
    pub fn is_choropleth(self) -> bool {
        self == LayerKind::Choropleth
    }
}

/// Selectable attribute of a choropleth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub key: String,
    pub label: String,
}

impl AttributeDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Layer as produced by the format loaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub id: LayerId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeDescriptor>>,
    /// Default visibility for non-choropleth layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Scenario the layer belongs to; `None` or the common dataset loads everywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
}

impl LayerDescriptor {
    pub fn new(
        id: impl Into<LayerId>,
        name: impl Into<String>,
        kind: LayerKind,
        features: Vec<Feature>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            features,
            attributes: None,
            visible: None,
            dataset: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<AttributeDescriptor>) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }
}

/// Registered layer. Features are shared so state snapshots clone cheaply.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    pub visible: bool,
    pub features: Arc<[Feature]>,
    pub attributes: Vec<AttributeDescriptor>,
}

impl Layer {
    pub fn is_choropleth(&self) -> bool {
        self.kind.is_choropleth()
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.iter().any(|a| a.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerDescriptor, LayerKind};
    use crate::config::LayersConfig;
    use crate::registry::LayerRegistry;
    use crate::selection::SpatialSelector;
    use foundation::ids::LayerId;
    use scene::Geometry;

    #[test]
    fn malformed_features_do_not_reject_the_layer() {
        let d: LayerDescriptor = serde_json::from_str(
            r#"{
                "id": "coops", "name": "Cooperativas", "type": "point_icon",
                "features": [
                    {"geometry": {"type": "Point", "coordinates": [0.5, 0.5]},
                     "properties": {"name": "Coop Sul", "ativa": true, "icon_size": [32, 32]}},
                    {"geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1]]]},
                     "properties": {"name": "Broken"}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(d.features.len(), 2);
        assert!(d.features[0].property("ativa").unwrap().is_null());
        assert!(d.features[1].geometry.is_none());

        let registry = LayerRegistry::load(vec![d], &LayersConfig::default());
        let out = SpatialSelector::new().select(
            registry.layers(),
            &Geometry::rectangle([0.0, 0.0], [1.0, 1.0]),
        );
        assert_eq!(out.result.get(&LayerId::new("coops")).map(|f| f.len()), Some(1));
        assert_eq!(out.stats.data_shape_errors, 1);
    }

    #[test]
    fn descriptor_accepts_loader_type_names() {
        let d: LayerDescriptor = serde_json::from_str(
            r#"{"id":"coops","name":"Cooperativas","type":"point_icon","dataset":"agro"}"#,
        )
        .unwrap();
        assert_eq!(d.kind, LayerKind::Point);
        assert!(d.features.is_empty());
        assert_eq!(d.dataset.as_deref(), Some("agro"));

        let b: LayerDescriptor =
            serde_json::from_str(r#"{"id":"br","name":"Limite","type":"geojson","visible":false}"#)
                .unwrap();
        assert_eq!(b.kind, LayerKind::Boundary);
        assert_eq!(b.visible, Some(false));
    }
}
