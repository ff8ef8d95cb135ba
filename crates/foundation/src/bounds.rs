/// Axis-aligned bounding box in planar (lon, lat) coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f64; 2]>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut out = Aabb2::new(*first, *first);
        for p in iter {
            out.expand_to(*p);
        }
        Some(out)
    }

    pub fn expand_to(&mut self, p: [f64; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    pub fn union(&self, other: &Aabb2) -> Aabb2 {
        let mut out = *self;
        out.expand_to(other.min);
        out.expand_to(other.max);
        out
    }

    /// Closed-interval overlap test; boxes that only touch count as intersecting.
    pub fn intersects(&self, other: &Aabb2) -> bool {
        !(self.max[0] < other.min[0]
            || other.max[0] < self.min[0]
            || self.max[1] < other.min[1]
            || other.max[1] < self.min[1])
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;

    #[test]
    fn from_points_covers_all_points() {
        let pts = [[1.0, 5.0], [-2.0, 3.0], [4.0, -1.0]];
        let b = Aabb2::from_points(pts.iter()).unwrap();
        assert_eq!(b.min, [-2.0, -1.0]);
        assert_eq!(b.max, [4.0, 5.0]);
        assert!(Aabb2::from_points(std::iter::empty::<&[f64; 2]>()).is_none());
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb2::new([0.0, 0.0], [1.0, 1.0]);
        let b = Aabb2::new([1.0, 0.5], [2.0, 2.0]);
        let c = Aabb2::new([1.5, 1.5], [2.0, 2.0]);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.union(&c).max, [2.0, 2.0]);
    }
}
