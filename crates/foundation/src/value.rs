use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Feature attribute bag. Insertion order follows the source document so
/// "first observed" rules stay deterministic.
pub type Properties = IndexMap<String, PropertyValue>;

/// Tagged scalar stored in a feature's property bag.
///
/// Decoding never fails on a well-formed JSON value: booleans, arrays and
/// objects (icon sizes, anchors, flags) carry no aggregatable data and
/// decode as `Null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    String(String),
    Null,
}

impl PropertyValue {
    /// Numeric value, if any. NaN is treated as "not a number" so it never
    /// poisons sums or min/max passes.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

struct PropertyValueVisitor;

impl<'de> Visitor<'de> for PropertyValueVisitor {
    type Value = PropertyValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(PropertyValue::Number(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(PropertyValue::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(PropertyValue::Number(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(PropertyValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(PropertyValue::String(v))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(PropertyValue::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(PropertyValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(PropertyValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(PropertyValue::Null)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(PropertyValue::Null)
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(PropertyValueVisitor)
    }
}

/// Builds a property bag from `(key, value)` pairs, keeping their order.
pub fn properties<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Properties, PropertyValue};

    #[test]
    fn deserializes_geojson_scalars_in_order() {
        let props: Properties =
            serde_json::from_str(r#"{"name":"CityA","ANNUAL":5.2,"note":null,"JAN":6}"#).unwrap();
        let keys: Vec<&str> = props.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "ANNUAL", "note", "JAN"]);
        assert_eq!(props["name"].as_str(), Some("CityA"));
        assert_eq!(props["ANNUAL"].as_number(), Some(5.2));
        assert_eq!(props["JAN"].as_number(), Some(6.0));
        assert!(props["note"].is_null());
    }

    #[test]
    fn non_scalar_values_decode_as_null() {
        let props: Properties = serde_json::from_str(
            r#"{"ativa":true,"icon_size":[32,32],"icon_anchor":{"x":16},"ANNUAL":5.0}"#,
        )
        .unwrap();
        assert!(props["ativa"].is_null());
        assert!(props["icon_size"].is_null());
        assert!(props["icon_anchor"].is_null());
        assert_eq!(props["ANNUAL"].as_number(), Some(5.0));
    }

    #[test]
    fn nan_is_not_numeric() {
        assert_eq!(PropertyValue::Number(f64::NAN).as_number(), None);
        assert_eq!(PropertyValue::from("7").as_number(), None);
    }
}
