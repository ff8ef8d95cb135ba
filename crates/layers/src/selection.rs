use foundation::bounds::Aabb2;
use foundation::ids::LayerId;
use indexmap::IndexMap;
use scene::feature::Feature;
use scene::geometry::Geometry;
use scene::intersects::{GeometryError, SelectionShape, validate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::layer::Layer;

/// Geometry emitted by the drawing tool on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawEvent {
    pub geometry: Geometry,
}

impl DrawEvent {
    pub fn new(geometry: Geometry) -> Self {
        Self { geometry }
    }
}

/// Features intersecting the drawn area, grouped by layer.
///
/// Ordering contract:
/// - Layers appear in registry order, features in layer order.
/// - A layer with no match is absent; every present list is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionResult {
    by_layer: IndexMap<LayerId, Vec<Feature>>,
}

impl SelectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_layer(&mut self, id: LayerId, features: Vec<Feature>) {
        if !features.is_empty() {
            self.by_layer.insert(id, features);
        }
    }

    pub fn get(&self, id: &LayerId) -> Option<&[Feature]> {
        self.by_layer.get(id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LayerId, &[Feature])> + '_ {
        self.by_layer.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn layer_ids(&self) -> impl Iterator<Item = &LayerId> + '_ {
        self.by_layer.keys()
    }

    pub fn len(&self) -> usize {
        self.by_layer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_layer.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.by_layer.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("invalid selection input: {0}")]
    InvalidSelectionInput(#[source] GeometryError),
}

/// Why one feature was left out of the scan.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("feature {index} of layer `{layer}` has no {missing}")]
    DataShape {
        layer: LayerId,
        index: usize,
        missing: &'static str,
    },
    #[error("feature {index} of layer `{layer}` could not be evaluated: {source}")]
    GeometryEvaluation {
        layer: LayerId,
        index: usize,
        #[source]
        source: GeometryError,
    },
}

/// Per-draw scan counters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SelectionStats {
    pub layers_scanned: usize,
    /// Features that reached the intersects predicate.
    pub features_tested: usize,
    pub features_matched: usize,
    pub geometry_errors: usize,
    pub data_shape_errors: usize,
    /// Features with geometry outside Point/MultiPoint/Polygon/MultiPolygon.
    pub unsupported_geometries: usize,
    /// Well-formed features a candidate source skipped without testing.
    pub pruned: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionOutcome {
    pub result: SelectionResult,
    pub stats: SelectionStats,
    /// Set when the drawn geometry itself was rejected.
    pub rejected: Option<SelectionError>,
}

/// Decides whether a well-formed feature is worth an intersects test.
///
/// Implementations may only reject features that cannot intersect `area`.
/// Data-shape and geometry checks run before the source is consulted, so the
/// selection and the failure counters match [`LinearScan`] exactly; only
/// `features_tested` and `pruned` depend on the source.
pub trait CandidateSource {
    fn admits(&self, feature: &Feature, area: &Aabb2) -> bool;
}

/// Every feature is tested.
#[derive(Debug, Copy, Clone, Default)]
pub struct LinearScan;

impl CandidateSource for LinearScan {
    fn admits(&self, _feature: &Feature, _area: &Aabb2) -> bool {
        true
    }
}

/// Skips features whose bounding box misses the drawn area's box.
#[derive(Debug, Copy, Clone, Default)]
pub struct BoundsPrefilter;

impl CandidateSource for BoundsPrefilter {
    fn admits(&self, feature: &Feature, area: &Aabb2) -> bool {
        feature.bounds().is_none_or(|b| b.intersects(area))
    }
}

enum Verdict {
    Match,
    Miss,
    Pruned,
    Unsupported,
}

fn evaluate(
    shape: &SelectionShape,
    candidates: &impl CandidateSource,
    layer: &LayerId,
    index: usize,
    feature: &Feature,
) -> Result<Verdict, FeatureError> {
    let data_shape = |missing| FeatureError::DataShape {
        layer: layer.clone(),
        index,
        missing,
    };
    let geometry_error = |source| FeatureError::GeometryEvaluation {
        layer: layer.clone(),
        index,
        source,
    };
    let geometry = feature.geometry.as_ref().ok_or_else(|| data_shape("geometry"))?;
    if feature.properties.is_none() {
        return Err(data_shape("properties"));
    }
    if let Geometry::Other { .. } = geometry {
        return Ok(Verdict::Unsupported);
    }
    validate(geometry).map_err(geometry_error)?;
    if !candidates.admits(feature, &shape.bounds()) {
        return Ok(Verdict::Pruned);
    }
    match shape.intersects(geometry) {
        Ok(true) => Ok(Verdict::Match),
        Ok(false) => Ok(Verdict::Miss),
        Err(source) => Err(geometry_error(source)),
    }
}

/// Intersects a drawn polygon against every registered layer, visible or not.
#[derive(Debug, Clone, Default)]
pub struct SpatialSelector<C = LinearScan> {
    candidates: C,
}

impl SpatialSelector<LinearScan> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: CandidateSource> SpatialSelector<C> {
    pub fn with_candidates(candidates: C) -> Self {
        Self { candidates }
    }

    /// Full scan. Fails only when the drawn geometry is unusable; per-feature
    /// failures are counted in the stats and the feature is excluded.
    pub fn try_select(
        &self,
        layers: &[Layer],
        drawn: &Geometry,
    ) -> Result<SelectionOutcome, SelectionError> {
        let shape = SelectionShape::new(drawn).map_err(SelectionError::InvalidSelectionInput)?;

        let mut result = SelectionResult::new();
        let mut stats = SelectionStats::default();

        for layer in layers {
            stats.layers_scanned += 1;
            let mut matched = Vec::new();
            for (index, feature) in layer.features.iter().enumerate() {
                match evaluate(&shape, &self.candidates, &layer.id, index, feature) {
                    Ok(Verdict::Match) => {
                        stats.features_tested += 1;
                        matched.push(feature.clone());
                    }
                    Ok(Verdict::Miss) => stats.features_tested += 1,
                    Ok(Verdict::Pruned) => stats.pruned += 1,
                    Ok(Verdict::Unsupported) => stats.unsupported_geometries += 1,
                    Err(e @ FeatureError::DataShape { .. }) => {
                        stats.data_shape_errors += 1;
                        debug!("skipping feature: {e}");
                    }
                    Err(e @ FeatureError::GeometryEvaluation { .. }) => {
                        stats.geometry_errors += 1;
                        debug!("excluding feature: {e}");
                    }
                }
            }
            stats.features_matched += matched.len();
            result.push_layer(layer.id.clone(), matched);
        }

        if stats.geometry_errors > 0 || stats.data_shape_errors > 0 {
            warn!(
                geometry_errors = stats.geometry_errors,
                data_shape_errors = stats.data_shape_errors,
                "selection skipped malformed features"
            );
        }
        debug!(
            layers = result.len(),
            features = stats.features_matched,
            "selection computed"
        );

        Ok(SelectionOutcome {
            result,
            stats,
            rejected: None,
        })
    }

    /// Like [`Self::try_select`], but an invalid drawing yields an empty
    /// result with the reason recorded instead of an error.
    pub fn select(&self, layers: &[Layer], drawn: &Geometry) -> SelectionOutcome {
        self.try_select(layers, drawn).unwrap_or_else(|e| {
            warn!("{e}");
            SelectionOutcome {
                rejected: Some(e),
                ..SelectionOutcome::default()
            }
        })
    }
}
