use serde::{Deserialize, Serialize};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Vocabulary driving aggregation and report building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Layer-name substrings (lowercase) that select the MAX policy.
    pub max_keywords: Vec<String>,
    /// Property keys never aggregated or charted (case-insensitive).
    pub excluded_keys: Vec<String>,
    /// Keys checked, in order, for a feature's location label.
    pub location_keys: Vec<String>,
    pub fallback_location: String,
    /// Month keys in calendar order.
    pub months: Vec<String>,
    /// Points kept in a ranking chart.
    pub ranking_limit: usize,
    /// Keys checked, in order, for a point of interest's display name.
    pub poi_name_keys: Vec<String>,
    pub poi_fallback_name: String,
    pub poi_description_keys: Vec<String>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_keywords: strings(&[
                "cultivo", "cultura", "pecuária", "produção", "milho", "soja", "feijao", "cafe",
                "banana", "dados", "csv",
            ]),
            excluded_keys: strings(&[
                "id",
                "name",
                "description",
                "descrição",
                "descricao",
                "LAT",
                "LON",
                "municipios",
                "icon_url",
                "icon_size",
                "icon_anchor",
                "TOTAL",
                "titulo",
            ]),
            location_keys: strings(&["name", "NAME", "nome", "municipio", "MUNICIPIO"]),
            fallback_location: "Local Desconhecido".to_string(),
            months: strings(&[
                "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
            ]),
            ranking_limit: 15,
            poi_name_keys: strings(&["name", "Name", "Nome", "titulo"]),
            poi_fallback_name: "Sem Nome".to_string(),
            poi_description_keys: strings(&["description", "Description", "descrição", "descricao"]),
        }
    }
}

impl AggregationConfig {
    pub fn is_excluded(&self, key: &str) -> bool {
        self.excluded_keys
            .iter()
            .any(|k| k.to_lowercase() == key.to_lowercase())
    }

    /// Calendar position of `key` when it names a month.
    pub fn month_index(&self, key: &str) -> Option<usize> {
        self.months.iter().position(|m| m.eq_ignore_ascii_case(key))
    }

    pub fn is_month(&self, key: &str) -> bool {
        self.month_index(key).is_some()
    }
}
