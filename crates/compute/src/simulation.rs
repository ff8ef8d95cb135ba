//! Photovoltaic output estimate over the aggregated irradiance.

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateRecord;
use crate::config::AggregationConfig;

/// Performance ratio applied to the nominal output.
pub const PERFORMANCE_FACTOR: f64 = 0.75;
const DAYS_PER_MONTH: f64 = 30.0;
const DAYS_PER_YEAR: f64 = 365.0;
const TYPICAL_EFFICIENCY_PCT: (f64, f64) = (15.0, 23.0);

/// Module layout entered on the simulation panel.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelInputs {
    pub count: u32,
    pub width_m: f64,
    pub height_m: f64,
    pub power_w: f64,
    /// Gap between rows.
    pub spacing_m: f64,
}

impl Default for PanelInputs {
    fn default() -> Self {
        Self {
            count: 100,
            width_m: 1.1,
            height_m: 2.3,
            power_w: 550.0,
            spacing_m: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("panel {field} must be a positive number, got {value}")]
    InvalidInput { field: &'static str, value: f64 },
}

impl PanelInputs {
    pub fn validate(&self) -> Result<(), SimulationError> {
        let checks = [
            ("width", self.width_m),
            ("height", self.height_m),
            ("power", self.power_w),
        ];
        for (field, value) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimulationError::InvalidInput { field, value });
            }
        }
        if !(self.spacing_m.is_finite() && self.spacing_m >= 0.0) {
            return Err(SimulationError::InvalidInput {
                field: "spacing",
                value: self.spacing_m,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GenerationEstimate {
    pub system_kwp: f64,
    /// kWh/m²/day.
    pub daily_irradiance: f64,
    pub daily_kwh: f64,
    pub monthly_kwh: f64,
    pub annual_kwh: f64,
    pub occupied_area_m2: f64,
    pub module_efficiency_pct: f64,
    /// Efficiency outside the usual commercial range.
    pub atypical_efficiency: bool,
}

/// `ANNUAL` of the first record carrying irradiance data (an `ANNUAL` or a
/// month key). A record with month keys but no `ANNUAL` yields 0.
pub fn irradiance_from(records: &[AggregateRecord], config: &AggregationConfig) -> Option<f64> {
    records
        .iter()
        .find(|r| {
            r.properties
                .keys()
                .any(|k| k == "ANNUAL" || config.is_month(k))
        })
        .map(|r| r.number("ANNUAL").unwrap_or(0.0))
}

pub fn estimate_generation(
    annual_irradiance: f64,
    inputs: &PanelInputs,
) -> Result<GenerationEstimate, SimulationError> {
    inputs.validate()?;
    let count = f64::from(inputs.count);

    let system_kwp = count * inputs.power_w / 1000.0;
    let daily_irradiance = annual_irradiance / 1000.0;
    let daily_kwh = system_kwp * daily_irradiance * PERFORMANCE_FACTOR;
    let module_area = inputs.width_m * inputs.height_m;
    let module_efficiency_pct = inputs.power_w / (module_area * 1000.0) * 100.0;
    let (lo, hi) = TYPICAL_EFFICIENCY_PCT;

    Ok(GenerationEstimate {
        system_kwp,
        daily_irradiance,
        daily_kwh,
        monthly_kwh: daily_kwh * DAYS_PER_MONTH,
        annual_kwh: daily_kwh * DAYS_PER_YEAR,
        occupied_area_m2: count * inputs.width_m * (inputs.height_m + inputs.spacing_m),
        module_efficiency_pct,
        atypical_efficiency: module_efficiency_pct > hi || module_efficiency_pct < lo,
    })
}

#[cfg(test)]
mod tests {
    use super::{PanelInputs, SimulationError, estimate_generation, irradiance_from};
    use crate::aggregate::{AggregateRecord, AggregateValue};
    use crate::config::AggregationConfig;
    use crate::policy::Policy;
    use approx::assert_relative_eq;
    use foundation::ids::LayerId;

    fn record(props: &[(&str, f64)]) -> AggregateRecord {
        AggregateRecord {
            layer_id: LayerId::new("base"),
            layer_name: "Irradiação".into(),
            count: 1,
            policy: Policy::Mean,
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), AggregateValue::Number(*v)))
                .collect(),
        }
    }

    #[test]
    fn default_layout_estimate() {
        let e = estimate_generation(5400.0, &PanelInputs::default()).unwrap();
        assert_relative_eq!(e.system_kwp, 55.0);
        assert_relative_eq!(e.daily_irradiance, 5.4);
        assert_relative_eq!(e.daily_kwh, 55.0 * 5.4 * 0.75, epsilon = 1e-9);
        assert_relative_eq!(e.monthly_kwh, e.daily_kwh * 30.0, epsilon = 1e-9);
        assert_relative_eq!(e.annual_kwh, e.daily_kwh * 365.0, epsilon = 1e-9);
        assert_relative_eq!(e.occupied_area_m2, 100.0 * 1.1 * 3.8, epsilon = 1e-9);
        assert_relative_eq!(e.module_efficiency_pct, 550.0 / 2530.0 * 100.0, epsilon = 1e-9);
        assert!(!e.atypical_efficiency);
    }

    #[test]
    fn flags_atypical_efficiency_and_rejects_bad_inputs() {
        let hot = PanelInputs {
            power_w: 700.0,
            ..Default::default()
        };
        assert!(estimate_generation(5000.0, &hot).unwrap().atypical_efficiency);

        let flat = PanelInputs {
            width_m: 0.0,
            ..Default::default()
        };
        assert_eq!(
            estimate_generation(5000.0, &flat),
            Err(SimulationError::InvalidInput {
                field: "width",
                value: 0.0
            })
        );
    }

    #[test]
    fn irradiance_comes_from_first_irradiance_record() {
        let config = AggregationConfig::default();
        let records = vec![
            record(&[("milho", 3.0)]),
            record(&[("JAN", 6.0)]),
            record(&[("ANNUAL", 5.5)]),
        ];
        assert_eq!(irradiance_from(&records, &config), Some(0.0));
        assert_eq!(irradiance_from(&records[2..], &config), Some(5.5));
        assert_eq!(irradiance_from(&records[..1], &config), None);
    }
}
