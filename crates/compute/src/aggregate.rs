use foundation::ids::LayerId;
use foundation::value::PropertyValue;
use indexmap::IndexMap;
use layers::layer::LayerKind;
use layers::registry::LayerRegistry;
use layers::selection::SelectionResult;
use scene::feature::Feature;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AggregationConfig;
use crate::policy::{Policy, policy_for};
use crate::statistics::MaxWithProvenance;

/// One aggregated property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateValue {
    /// MEAN result.
    Number(f64),
    /// MAX result with the location label of the feature attaining it.
    Max { value: f64, location: String },
    /// First observed non-numeric value of the key.
    Context(PropertyValue),
}

impl AggregateValue {
    /// Charted value: the mean or the maximum.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            AggregateValue::Number(v) => Some(*v),
            AggregateValue::Max { value, .. } => Some(*value),
            AggregateValue::Context(_) => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            AggregateValue::Max { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// Summary of one choropleth layer's intersected features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub layer_id: LayerId,
    pub layer_name: String,
    /// Intersected features, always at least 1.
    pub count: usize,
    pub policy: Policy,
    pub properties: IndexMap<String, AggregateValue>,
}

impl AggregateRecord {
    pub fn get(&self, key: &str) -> Option<&AggregateValue> {
        self.properties.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key)?.numeric()
    }
}

/// Non-choropleth layer handed through to the report untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PassThroughLayer {
    pub layer_id: LayerId,
    pub layer_name: String,
    pub kind: Option<LayerKind>,
    pub features: Vec<Feature>,
}

/// Output of [`aggregate`], both lists in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateReport {
    pub records: Vec<AggregateRecord>,
    pub pass_through: Vec<PassThroughLayer>,
}

impl AggregateReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.pass_through.is_empty()
    }

    pub fn record(&self, id: &LayerId) -> Option<&AggregateRecord> {
        self.records.iter().find(|r| &r.layer_id == id)
    }
}

fn location_of(feature: &Feature, config: &AggregationConfig) -> String {
    feature
        .first_text(&config.location_keys)
        .unwrap_or(&config.fallback_location)
        .to_string()
}

/// Summarises `features` under `policy`. `None` when there is nothing to
/// summarise.
///
/// MEAN divides each key's sum by the number of features, including features
/// lacking the key. MAX keeps the first feature attaining the maximum.
pub fn aggregate_features(
    layer_id: &LayerId,
    layer_name: &str,
    features: &[Feature],
    policy: Policy,
    config: &AggregationConfig,
) -> Option<AggregateRecord> {
    if features.is_empty() {
        return None;
    }

    let mut context: IndexMap<String, PropertyValue> = IndexMap::new();
    let mut sums: IndexMap<String, f64> = IndexMap::new();
    let mut maxima: IndexMap<String, MaxWithProvenance<String>> = IndexMap::new();

    for feature in features {
        let Some(props) = feature.properties.as_ref() else {
            continue;
        };
        let location = location_of(feature, config);

        for (key, value) in props {
            if config.is_excluded(key) {
                continue;
            }
            let Some(v) = value.as_number() else {
                if !context.contains_key(key) {
                    context.insert(key.clone(), value.clone());
                }
                continue;
            };
            match policy {
                Policy::Mean => *sums.entry(key.clone()).or_insert(0.0) += v,
                Policy::Max => match maxima.get_mut(key) {
                    Some(m) => {
                        m.offer(v, || location.clone());
                    }
                    None => {
                        maxima.insert(key.clone(), MaxWithProvenance::new(v, location.clone()));
                    }
                },
            }
        }
    }

    let n = features.len() as f64;
    let mut properties: IndexMap<String, AggregateValue> = context
        .into_iter()
        .map(|(k, v)| (k, AggregateValue::Context(v)))
        .collect();
    for (key, sum) in sums {
        let mean = if features.len() == 1 { sum } else { sum / n };
        properties.insert(key, AggregateValue::Number(mean));
    }
    for (key, max) in maxima {
        properties.insert(
            key,
            AggregateValue::Max {
                value: max.value,
                location: max.source,
            },
        );
    }

    Some(AggregateRecord {
        layer_id: layer_id.clone(),
        layer_name: layer_name.to_string(),
        count: features.len(),
        policy,
        properties,
    })
}

/// Aggregates every choropleth layer of `selection`; other layers pass
/// through. Pure: the same selection and registry always give the same report.
pub fn aggregate(
    selection: &SelectionResult,
    registry: &LayerRegistry,
    config: &AggregationConfig,
) -> AggregateReport {
    let mut report = AggregateReport::default();

    for (id, features) in selection.iter() {
        let layer = registry.get(id);
        let name = layer.map_or_else(|| id.as_str(), |l| l.name.as_str());

        match layer {
            Some(l) if l.is_choropleth() => {
                let policy = policy_for(name, config);
                if let Some(record) = aggregate_features(id, name, features, policy, config) {
                    report.records.push(record);
                }
            }
            _ => report.pass_through.push(PassThroughLayer {
                layer_id: id.clone(),
                layer_name: name.to_string(),
                kind: layer.map(|l| l.kind),
                features: features.to_vec(),
            }),
        }
    }

    debug!(
        records = report.records.len(),
        pass_through = report.pass_through.len(),
        "aggregation computed"
    );
    report
}
