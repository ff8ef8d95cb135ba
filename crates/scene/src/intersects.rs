use foundation::bounds::Aabb2;
use geo::{Coord, Intersects, LineString, MultiPoint, MultiPolygon, Point, Polygon};

use crate::geometry::{Geometry, Position, Ring};

/// Why a geometry could not be evaluated by the intersects predicate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("{kind} geometry has no coordinates")]
    Empty { kind: String },
    #[error("{kind} geometry contains a non-finite coordinate")]
    NonFinite { kind: String },
    #[error("ring has {distinct} distinct positions, need at least 3")]
    DegenerateRing { distinct: usize },
    #[error("{kind} geometry is not supported by the intersects predicate")]
    Unsupported { kind: String },
}

/// Checks that `geometry` can be handed to the planar predicate.
///
/// Self-intersecting rings and repeated vertices are accepted; only
/// structurally unusable input (no coordinates, NaN/inf, rings collapsing to
/// fewer than three distinct positions) is rejected.
pub fn validate(geometry: &Geometry) -> Result<(), GeometryError> {
    let kind = || geometry.type_name().to_string();

    if let Geometry::Other { .. } = geometry {
        return Err(GeometryError::Unsupported { kind: kind() });
    }
    if geometry.is_empty() {
        return Err(GeometryError::Empty { kind: kind() });
    }
    if geometry
        .positions()
        .any(|p| !p[0].is_finite() || !p[1].is_finite())
    {
        return Err(GeometryError::NonFinite { kind: kind() });
    }

    match geometry {
        Geometry::Polygon(rings) => validate_polygon(rings),
        Geometry::MultiPolygon(polys) => polys.iter().try_for_each(|p| validate_polygon(p)),
        _ => Ok(()),
    }
}

fn validate_polygon(rings: &[Ring]) -> Result<(), GeometryError> {
    if rings.is_empty() {
        return Err(GeometryError::Empty {
            kind: "Polygon".to_string(),
        });
    }
    for ring in rings {
        let distinct = distinct_positions(ring);
        if distinct < 3 {
            return Err(GeometryError::DegenerateRing { distinct });
        }
    }
    Ok(())
}

/// Counts positions after collapsing consecutive repeats and the closing point.
fn distinct_positions(ring: &[Position]) -> usize {
    let mut out: Vec<Position> = Vec::with_capacity(ring.len());
    for p in ring {
        if out.last() != Some(p) {
            out.push(*p);
        }
    }
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out.len()
}

fn to_line_string(ring: &[Position]) -> LineString<f64> {
    LineString::new(ring.iter().map(|p| Coord { x: p[0], y: p[1] }).collect())
}

fn to_polygon(rings: &[Ring]) -> Polygon<f64> {
    let mut iter = rings.iter();
    let exterior = iter
        .next()
        .map(|r| to_line_string(r))
        .unwrap_or_else(|| LineString::new(Vec::new()));
    let interiors = iter.map(|r| to_line_string(r)).collect();
    Polygon::new(exterior, interiors)
}

/// Converts a validated geometry into its `geo` counterpart.
pub fn to_geo(geometry: &Geometry) -> Result<geo::Geometry<f64>, GeometryError> {
    validate(geometry)?;
    let out = match geometry {
        Geometry::Point(p) => geo::Geometry::Point(Point::new(p[0], p[1])),
        Geometry::MultiPoint(points) => geo::Geometry::MultiPoint(MultiPoint::new(
            points.iter().map(|p| Point::new(p[0], p[1])).collect(),
        )),
        Geometry::Polygon(rings) => geo::Geometry::Polygon(to_polygon(rings)),
        Geometry::MultiPolygon(polys) => geo::Geometry::MultiPolygon(MultiPolygon::new(
            polys.iter().map(|rings| to_polygon(rings)).collect(),
        )),
        Geometry::Other { kind } => {
            return Err(GeometryError::Unsupported { kind: kind.clone() });
        }
    };
    Ok(out)
}

/// A drawn selection area, normalised and ready for repeated predicate calls.
#[derive(Debug, Clone)]
pub struct SelectionShape {
    shape: geo::Geometry<f64>,
    bounds: Aabb2,
}

impl SelectionShape {
    /// Accepts only Polygon/MultiPolygon input with usable coordinates.
    pub fn new(geometry: &Geometry) -> Result<Self, GeometryError> {
        if !geometry.is_areal() {
            return Err(GeometryError::Unsupported {
                kind: geometry.type_name().to_string(),
            });
        }
        let shape = to_geo(geometry)?;
        let bounds = geometry.bounds().ok_or_else(|| GeometryError::Empty {
            kind: geometry.type_name().to_string(),
        })?;
        Ok(Self { shape, bounds })
    }

    pub fn bounds(&self) -> Aabb2 {
        self.bounds
    }

    /// Any shared point, including touching boundaries and containment
    /// in either direction.
    pub fn intersects(&self, geometry: &Geometry) -> Result<bool, GeometryError> {
        let other = to_geo(geometry)?;
        Ok(self.shape.intersects(&other))
    }
}
