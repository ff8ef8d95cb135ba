use foundation::bounds::Aabb2;
use serde::{Deserialize, Serialize};

/// Planar `[x, y]` / `[lon, lat]` position. Extra ordinates (elevation) are
/// dropped when decoding.
pub type Position = [f64; 2];

/// Closed or open linear ring; closure is not required.
pub type Ring = Vec<Position>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    Polygon,
    MultiPolygon,
    Other,
}

/// Feature geometry as handed over by the format loaders.
///
/// Only point and areal variants take part in selection; everything else
/// (lines, collections) is kept as `Other` so a layer can still carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometry", into = "RawGeometry")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    Other { kind: String },
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::Other { .. } => GeometryKind::Other,
        }
    }

    /// GeoJSON type name.
    pub fn type_name(&self) -> &str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::Other { kind } => kind.as_str(),
        }
    }

    pub fn is_areal(&self) -> bool {
        matches!(self, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
    }

    /// Axis-aligned rectangle as a single-ring polygon (rectangle draw tool).
    pub fn rectangle(min: Position, max: Position) -> Self {
        Geometry::Polygon(vec![vec![
            [min[0], min[1]],
            [max[0], min[1]],
            [max[0], max[1]],
            [min[0], max[1]],
            [min[0], min[1]],
        ]])
    }

    pub fn positions(&self) -> Box<dyn Iterator<Item = &Position> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(p)),
            Geometry::MultiPoint(points) => Box::new(points.iter()),
            Geometry::Polygon(rings) => Box::new(rings.iter().flatten()),
            Geometry::MultiPolygon(polys) => Box::new(polys.iter().flatten().flatten()),
            Geometry::Other { .. } => Box::new(std::iter::empty()),
        }
    }

    /// `true` when there is no coordinate at all.
    pub fn is_empty(&self) -> bool {
        self.positions().next().is_none()
    }

    pub fn bounds(&self) -> Option<Aabb2> {
        Aabb2::from_points(self.positions())
    }
}

/// GeoJSON wire shape: `{"type": ..., "coordinates": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    coordinates: serde_json::Value,
}

type RawPosition = Vec<f64>;

fn position(raw: RawPosition) -> Result<Position, String> {
    match raw.as_slice() {
        [x, y, ..] => Ok([*x, *y]),
        _ => Err(format!(
            "position needs at least 2 ordinates, got {}",
            raw.len()
        )),
    }
}

fn ring(raw: Vec<RawPosition>) -> Result<Ring, String> {
    raw.into_iter().map(position).collect()
}

fn polygon(raw: Vec<Vec<RawPosition>>) -> Result<Vec<Ring>, String> {
    raw.into_iter().map(ring).collect()
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| e.to_string())
}

impl TryFrom<RawGeometry> for Geometry {
    type Error = String;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        let coords = raw.coordinates;
        let geometry = match raw.kind.as_str() {
            "Point" => Geometry::Point(position(decode(coords)?)?),
            "MultiPoint" => Geometry::MultiPoint(ring(decode(coords)?)?),
            "Polygon" => Geometry::Polygon(polygon(decode(coords)?)?),
            "MultiPolygon" => {
                let raw: Vec<Vec<Vec<RawPosition>>> = decode(coords)?;
                Geometry::MultiPolygon(raw.into_iter().map(polygon).collect::<Result<_, _>>()?)
            }
            _ => Geometry::Other { kind: raw.kind },
        };
        Ok(geometry)
    }
}

impl From<Geometry> for RawGeometry {
    fn from(geometry: Geometry) -> Self {
        let coordinates = match &geometry {
            Geometry::Point(p) => serde_json::json!(p),
            Geometry::MultiPoint(points) => serde_json::json!(points),
            Geometry::Polygon(rings) => serde_json::json!(rings),
            Geometry::MultiPolygon(polys) => serde_json::json!(polys),
            Geometry::Other { .. } => serde_json::Value::Null,
        };
        RawGeometry {
            kind: geometry.type_name().to_string(),
            coordinates,
        }
    }
}
