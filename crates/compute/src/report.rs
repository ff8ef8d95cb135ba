//! Report building: chart series, diagnosis and points of interest.

use foundation::ids::LayerId;
use foundation::value::Properties;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{AggregateRecord, AggregateReport};
use crate::config::AggregationConfig;
use crate::policy::Policy;
use crate::simulation::{GenerationEstimate, PanelInputs, estimate_generation, irradiance_from};
use crate::statistics::Statistics;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartOrder {
    /// Calendar order, non-month keys after the months.
    Monthly,
    /// Descending value, truncated to the ranking limit.
    Ranking,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub layer_id: LayerId,
    pub layer_name: String,
    pub order: ChartOrder,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Value axis extent.
    pub fn range(&self) -> Option<(f64, f64)> {
        Statistics::min_max(&self.values())
    }

    pub fn mean(&self) -> Option<f64> {
        Statistics::mean(&self.values())
    }
}

/// Chart for one record; `None` when nothing is chartable.
pub fn chart_series(record: &AggregateRecord, config: &AggregationConfig) -> Option<ChartSeries> {
    let mut points: Vec<ChartPoint> = record
        .properties
        .iter()
        .filter(|(key, _)| !config.is_excluded(key))
        .filter_map(|(key, value)| {
            Some(ChartPoint {
                key: key.clone(),
                value: value.numeric()?,
            })
        })
        .collect();
    if points.is_empty() {
        return None;
    }

    let order = if points.iter().any(|p| config.is_month(&p.key)) {
        points.sort_by_key(|p| config.month_index(&p.key).unwrap_or(usize::MAX));
        ChartOrder::Monthly
    } else {
        points.sort_by(|a, b| b.value.total_cmp(&a.value));
        points.truncate(config.ranking_limit);
        ChartOrder::Ranking
    };

    Some(ChartSeries {
        layer_id: record.layer_id.clone(),
        layer_name: record.layer_name.clone(),
        order,
        points,
    })
}

/// Reference row keyed by crop category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRow {
    #[serde(rename = "Cultura", default)]
    pub category: String,
    #[serde(rename = "PainelRecomendado", default)]
    pub panel: String,
    #[serde(rename = "IrrigacaoRecomendada", default)]
    pub irrigation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub panel: String,
    pub irrigation: String,
}

/// Uppercased category → recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationTable {
    entries: IndexMap<String, Recommendation>,
}

impl RecommendationTable {
    /// Builds the table; rows without a category are skipped and later rows
    /// replace earlier ones with the same key.
    pub fn from_rows(rows: impl IntoIterator<Item = RecommendationRow>) -> Self {
        let entries = rows
            .into_iter()
            .filter(|r| !r.category.trim().is_empty())
            .map(|r| {
                (
                    r.category.to_uppercase(),
                    Recommendation {
                        panel: r.panel,
                        irrigation: r.irrigation,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks `key` up uppercased, then in its quoted form as some CSV
    /// exports keep the quotes in the header cell.
    pub fn lookup(&self, key: &str) -> Option<&Recommendation> {
        let upper = key.to_uppercase();
        self.entries
            .get(&upper)
            .or_else(|| self.entries.get(&format!("\"{upper}\"")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub layer_id: LayerId,
    pub category: String,
    pub value: f64,
    pub location: String,
    pub panel: String,
    pub irrigation: String,
}

/// First MAX record whose leading attribute has a recommendation.
pub fn diagnose(records: &[AggregateRecord], table: &RecommendationTable) -> Option<Diagnosis> {
    for record in records.iter().filter(|r| r.policy == Policy::Max) {
        let located: Vec<(&String, f64, &str)> = record
            .properties
            .iter()
            .filter_map(|(k, v)| Some((k, v.numeric()?, v.location()?)))
            .collect();
        let Some((i, value)) = Statistics::argmax_first(located.iter().map(|(_, v, _)| *v)) else {
            continue;
        };
        let (key, _, location) = located[i];
        if let Some(rec) = table.lookup(key) {
            return Some(Diagnosis {
                layer_id: record.layer_id.clone(),
                category: key.clone(),
                value,
                location: location.to_string(),
                panel: rec.panel.clone(),
                irrigation: rec.irrigation.clone(),
            });
        }
        debug!(layer = %record.layer_id, category = key.as_str(), "no recommendation");
    }
    None
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointOfInterest {
    pub layer_id: LayerId,
    pub layer_name: String,
    pub name: String,
    pub description: Option<String>,
    /// Remaining properties, excluded keys dropped.
    pub properties: Properties,
}

pub fn points_of_interest(report: &AggregateReport, config: &AggregationConfig) -> Vec<PointOfInterest> {
    let mut out = Vec::new();
    for layer in &report.pass_through {
        for feature in &layer.features {
            let name = feature
                .first_text(&config.poi_name_keys)
                .unwrap_or(&config.poi_fallback_name)
                .to_string();
            let description = feature
                .first_text(&config.poi_description_keys)
                .map(str::to_string);
            let properties = feature
                .properties
                .iter()
                .flatten()
                .filter(|(k, _)| !config.is_excluded(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            out.push(PointOfInterest {
                layer_id: layer.layer_id.clone(),
                layer_name: layer.layer_name.clone(),
                name,
                description,
                properties,
            });
        }
    }
    out
}

/// Everything the reporting panel shows for one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub charts: Vec<ChartSeries>,
    pub diagnosis: Option<Diagnosis>,
    pub points_of_interest: Vec<PointOfInterest>,
    pub generation: Option<GenerationEstimate>,
}

pub fn build_report(
    aggregates: &AggregateReport,
    table: &RecommendationTable,
    panels: &PanelInputs,
    config: &AggregationConfig,
) -> Report {
    let charts = aggregates
        .records
        .iter()
        .filter_map(|r| chart_series(r, config))
        .collect();
    let generation = irradiance_from(&aggregates.records, config)
        .and_then(|irradiance| match estimate_generation(irradiance, panels) {
            Ok(estimate) => Some(estimate),
            Err(e) => {
                debug!("generation estimate skipped: {e}");
                None
            }
        });

    Report {
        charts,
        diagnosis: diagnose(&aggregates.records, table),
        points_of_interest: points_of_interest(aggregates, config),
        generation,
    }
}
