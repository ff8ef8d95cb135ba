//! Attribute catalog of choropleth layers.

use scene::feature::Feature;

use crate::config::LayersConfig;
use crate::layer::{AttributeDescriptor, Layer};

/// Derives the selectable attributes from the first feature's numeric keys.
///
/// Only the first feature is sampled; loaders are expected to emit a uniform
/// schema per choropleth layer.
pub fn derive_attributes(features: &[Feature], config: &LayersConfig) -> Vec<AttributeDescriptor> {
    let Some(props) = features.first().and_then(|f| f.properties.as_ref()) else {
        return Vec::new();
    };
    props
        .iter()
        .filter(|(key, value)| value.as_number().is_some() && !config.is_excluded_attribute(key))
        .map(|(key, _)| AttributeDescriptor::new(key.clone(), config.label_for(key)))
        .collect()
}

/// Picks the attribute to color `active` by.
///
/// The previous choice survives when the active layer still offers it;
/// otherwise the layer's first attribute is used.
pub fn resolve_selected_attribute(active: Option<&Layer>, previous: Option<&str>) -> Option<String> {
    let layer = active?;
    if let Some(prev) = previous
        && layer.has_attribute(prev)
    {
        return Some(prev.to_string());
    }
    layer.attributes.first().map(|a| a.key.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{derive_attributes, resolve_selected_attribute};
    use crate::config::LayersConfig;
    use crate::layer::{AttributeDescriptor, Layer, LayerKind};
    use foundation::value::{PropertyValue, properties};
    use pretty_assertions::assert_eq;
    use scene::{Feature, Geometry};

    #[test]
    fn derives_numeric_non_excluded_keys_with_labels() {
        let f = Feature::new(
            Geometry::Point([0.0, 0.0]),
            properties([
                ("ID", PropertyValue::Number(1.0)),
                ("LON", PropertyValue::Number(-44.0)),
                ("NOME", PropertyValue::from("x")),
                ("JAN", PropertyValue::Number(6.1)),
                ("ANNUAL", PropertyValue::Number(5.4)),
            ]),
        );
        let attrs = derive_attributes(&[f], &LayersConfig::default());
        assert_eq!(
            attrs,
            vec![
                AttributeDescriptor::new("JAN", "Janeiro"),
                AttributeDescriptor::new("ANNUAL", "Anual"),
            ]
        );
        assert!(derive_attributes(&[], &LayersConfig::default()).is_empty());
    }

    #[test]
    fn keeps_previous_attribute_only_when_offered() {
        let layer = Layer {
            id: "soja".into(),
            name: "Produção de Soja".into(),
            kind: LayerKind::Choropleth,
            visible: true,
            features: Arc::from(Vec::new()),
            attributes: vec![
                AttributeDescriptor::new("2021", "2021"),
                AttributeDescriptor::new("2022", "2022"),
            ],
        };
        assert_eq!(
            resolve_selected_attribute(Some(&layer), Some("2022")).as_deref(),
            Some("2022")
        );
        assert_eq!(
            resolve_selected_attribute(Some(&layer), Some("ANNUAL")).as_deref(),
            Some("2021")
        );
        assert_eq!(resolve_selected_attribute(None, Some("2022")), None);
    }
}
