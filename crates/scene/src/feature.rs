use foundation::bounds::Aabb2;
use foundation::value::{Properties, PropertyValue};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::geometry::Geometry;

/// One GeoJSON-style feature. Source data may omit either half; consumers
/// treat a missing part as a data-shape problem and skip the feature.
///
/// A malformed geometry or property object decodes as missing rather than
/// failing the surrounding collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, deserialize_with = "lenient")]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<Properties>,
}

fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(d)?;
    let Some(raw) = raw.filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    match serde_json::from_value(raw) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            warn!("dropping malformed feature part: {e}");
            Ok(None)
        }
    }
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Properties) -> Self {
        Self {
            geometry: Some(geometry),
            properties: Some(properties),
        }
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.as_ref()?.get(key)
    }

    /// Numeric value of `key`, ignoring strings, nulls and NaN.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.property(key)?.as_number()
    }

    /// First non-empty string among `keys`, in the given order.
    pub fn first_text(&self, keys: &[String]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.property(k)?.as_str())
            .find(|s| !s.is_empty())
    }

    pub fn bounds(&self) -> Option<Aabb2> {
        self.geometry.as_ref()?.bounds()
    }
}
