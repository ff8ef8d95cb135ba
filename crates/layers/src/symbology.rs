use tracing::debug;

use crate::layer::Layer;

/// Numeric `[min, max]` of the active attribute over the visible choropleth.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AttributeDomain {
    pub min: f64,
    pub max: f64,
    /// Number of numeric samples seen.
    pub samples: usize,
}

impl AttributeDomain {
    /// "No data" domain.
    pub const EMPTY: AttributeDomain = AttributeDomain {
        min: 0.0,
        max: 0.0,
        samples: 0,
    };

    pub fn has_data(&self) -> bool {
        self.samples > 0
    }

    /// Zero-width domain (no data, or a flat surface).
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

impl Default for AttributeDomain {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("no choropleth layer is visible")]
    NoVisibleChoropleth,
    #[error("no attribute selected")]
    NoAttributeSelected,
    #[error("attribute `{attribute}` has no numeric value in layer `{layer}`")]
    MissingAttribute { layer: String, attribute: String },
}

/// Single pass over `layer`'s features collecting numeric `attribute` values.
pub fn try_compute_domain(layer: &Layer, attribute: &str) -> Result<AttributeDomain, DomainError> {
    let mut out: Option<AttributeDomain> = None;
    for v in layer.features.iter().filter_map(|f| f.number(attribute)) {
        let d = out.get_or_insert(AttributeDomain {
            min: v,
            max: v,
            samples: 0,
        });
        d.min = d.min.min(v);
        d.max = d.max.max(v);
        d.samples += 1;
    }
    out.ok_or_else(|| DomainError::MissingAttribute {
        layer: layer.id.to_string(),
        attribute: attribute.to_string(),
    })
}

/// Domain for the color scale; every failure degrades to `(0, 0)`.
pub fn compute_domain(active: Option<&Layer>, attribute: Option<&str>) -> AttributeDomain {
    let result = match (active, attribute) {
        (None, _) => Err(DomainError::NoVisibleChoropleth),
        (Some(_), None) => Err(DomainError::NoAttributeSelected),
        (Some(layer), Some(attr)) => try_compute_domain(layer, attr),
    };
    result.unwrap_or_else(|e| {
        debug!("attribute domain degraded to no data: {e}");
        AttributeDomain::EMPTY
    })
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb([r, g, b])
    }

    pub fn hex(&self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// ColorBrewer YlOrRd, 9 classes.
const YL_OR_RD: [Rgb; 9] = [
    Rgb::new(0xff, 0xff, 0xcc),
    Rgb::new(0xff, 0xed, 0xa0),
    Rgb::new(0xfe, 0xd9, 0x76),
    Rgb::new(0xfe, 0xb2, 0x4c),
    Rgb::new(0xfd, 0x8d, 0x3c),
    Rgb::new(0xfc, 0x4e, 0x2a),
    Rgb::new(0xe3, 0x1a, 0x1c),
    Rgb::new(0xbd, 0x00, 0x26),
    Rgb::new(0x80, 0x00, 0x26),
];

/// Fill for features whose attribute is missing or not numeric.
pub const NO_DATA_COLOR: Rgb = Rgb::new(0xcc, 0xcc, 0xcc);

/// Piecewise-linear YlOrRd ramp, `t` clamped to `[0, 1]`.
pub fn interpolate_yl_or_rd(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let pos = t * (YL_OR_RD.len() - 1) as f64;
    let i = (pos.floor() as usize).min(YL_OR_RD.len() - 2);
    let frac = pos - i as f64;
    let (a, b) = (YL_OR_RD[i].0, YL_OR_RD[i + 1].0);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    Rgb([lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2])])
}

/// End colors and labels of the legend bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub min: f64,
    pub max: f64,
    pub min_color: Rgb,
    pub max_color: Rgb,
}

impl Legend {
    pub fn labels(&self) -> (String, String) {
        (format!("{:.2}", self.min), format!("{:.2}", self.max))
    }
}

/// Sequential color scale over an [`AttributeDomain`].
///
/// A zero-width domain maps every numeric value to the ramp midpoint, so the
/// scale never divides by the domain width.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorScale {
    domain: AttributeDomain,
}

impl ColorScale {
    pub fn new(domain: AttributeDomain) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> AttributeDomain {
        self.domain
    }

    pub fn color(&self, value: f64) -> Rgb {
        if self.domain.is_degenerate() {
            return interpolate_yl_or_rd(0.5);
        }
        let t = (value - self.domain.min) / (self.domain.max - self.domain.min);
        interpolate_yl_or_rd(t)
    }

    /// Fill for an optional attribute value.
    pub fn fill(&self, value: Option<f64>) -> Rgb {
        value.map_or(NO_DATA_COLOR, |v| self.color(v))
    }

    /// Legend for non-degenerate domains only.
    pub fn legend(&self) -> Option<Legend> {
        if self.domain.is_degenerate() {
            return None;
        }
        Some(Legend {
            min: self.domain.min,
            max: self.domain.max,
            min_color: self.color(self.domain.min),
            max_color: self.color(self.domain.max),
        })
    }
}
