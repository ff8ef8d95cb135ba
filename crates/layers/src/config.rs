use foundation::ids::LayerId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Registry and attribute-catalog settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayersConfig {
    /// Choropleth shown at startup. Falls back to the first choropleth.
    pub base_layer_id: Option<LayerId>,
    /// Active scenario; descriptors of other scenarios are not loaded.
    pub dataset_context: Option<String>,
    /// Dataset tag shared by every scenario.
    pub common_dataset: String,
    /// Numeric keys never offered as color attributes (case-insensitive).
    pub attribute_exclusions: Vec<String>,
    /// Display labels keyed by uppercased attribute key.
    pub attribute_labels: IndexMap<String, String>,
}

impl Default for LayersConfig {
    fn default() -> Self {
        let labels = [
            ("JAN", "Janeiro"),
            ("FEB", "Fevereiro"),
            ("MAR", "Março"),
            ("APR", "Abril"),
            ("MAY", "Maio"),
            ("JUN", "Junho"),
            ("JUL", "Julho"),
            ("AUG", "Agosto"),
            ("SEP", "Setembro"),
            ("OCT", "Outubro"),
            ("NOV", "Novembro"),
            ("DEC", "Dezembro"),
            ("ANNUAL", "Anual"),
        ];
        Self {
            base_layer_id: Some(LayerId::new("choropleth-mg")),
            dataset_context: None,
            common_dataset: "common".to_string(),
            attribute_exclusions: vec!["ID".into(), "LAT".into(), "LON".into()],
            attribute_labels: labels
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl LayersConfig {
    pub fn is_excluded_attribute(&self, key: &str) -> bool {
        self.attribute_exclusions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(key))
    }

    pub fn label_for(&self, key: &str) -> String {
        self.attribute_labels
            .get(&key.to_uppercase())
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Whether a descriptor tagged with `dataset` belongs to the active scenario.
    pub fn accepts_dataset(&self, dataset: Option<&str>) -> bool {
        match dataset {
            None => true,
            Some(d) if d == self.common_dataset => true,
            Some(d) => self.dataset_context.as_deref() == Some(d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LayersConfig;

    #[test]
    fn labels_and_exclusions_ignore_case() {
        let c = LayersConfig::default();
        assert_eq!(c.label_for("annual"), "Anual");
        assert_eq!(c.label_for("milho"), "milho");
        assert!(c.is_excluded_attribute("lat"));
        assert!(!c.is_excluded_attribute("JAN"));
    }

    #[test]
    fn dataset_filter_keeps_common_and_active_context() {
        let c = LayersConfig {
            dataset_context: Some("agro".to_string()),
            ..Default::default()
        };
        assert!(c.accepts_dataset(None));
        assert!(c.accepts_dataset(Some("common")));
        assert!(c.accepts_dataset(Some("agro")));
        assert!(!c.accepts_dataset(Some("urbano")));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c: LayersConfig = serde_json::from_str(r#"{"base_layer_id":"base"}"#).unwrap();
        assert_eq!(c.base_layer_id.unwrap().as_str(), "base");
        assert_eq!(c.common_dataset, "common");
        assert_eq!(c.attribute_exclusions.len(), 3);
    }
}
