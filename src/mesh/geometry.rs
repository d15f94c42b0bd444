//! Small fixed-size vector helpers and simplex metrics.
//!
//! All coordinates are stored as `[f64; 3]`. Two-dimensional meshes keep the
//! third component at zero, so the same helpers serve both dimensions.

/// A point or vector in up to three dimensions.
pub type Vec3 = [f64; 3];

/// Zero vector.
pub const ZERO: Vec3 = [0.0; 3];

#[inline(always)]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline(always)]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline(always)]
pub fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline(always)]
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline(always)]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline(always)]
pub fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Arithmetic mean of a set of points.
pub fn mean(points: impl IntoIterator<Item = Vec3>) -> Vec3 {
    let mut sum = ZERO;
    let mut count = 0usize;
    for p in points {
        sum = add(sum, p);
        count += 1;
    }
    if count == 0 {
        return ZERO;
    }
    scale(sum, 1.0 / count as f64)
}

/// Unsigned area of the triangle (a, b, c).
#[inline]
pub fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    0.5 * norm(cross(sub(b, a), sub(c, a)))
}

/// Unsigned volume of the tetrahedron (a, b, c, d).
#[inline]
pub fn tetrahedron_volume(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> f64 {
    dot(cross(sub(b, a), sub(c, a)), sub(d, a)).abs() / 6.0
}

/// Accumulates measure-weighted centroids of simplices.
#[derive(Clone, Copy, Debug, Default)]
pub struct CentroidAccumulator {
    weighted: Vec3,
    measure: f64,
}

impl CentroidAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a simplex with the given centroid and measure.
    #[inline]
    pub fn push(&mut self, centroid: Vec3, measure: f64) {
        self.weighted = add(self.weighted, scale(centroid, measure));
        self.measure += measure;
    }

    /// Add a triangle (2-D cell or face piece).
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        self.push(mean([a, b, c]), triangle_area(a, b, c));
    }

    /// Add a tetrahedron.
    pub fn push_tetrahedron(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        self.push(mean([a, b, c, d]), tetrahedron_volume(a, b, c, d));
    }

    /// Total accumulated measure.
    pub fn measure(&self) -> f64 {
        self.measure
    }

    /// Measure-weighted centroid, or `None` for a zero total measure.
    pub fn centroid(&self) -> Option<Vec3> {
        if self.measure > 0.0 {
            Some(scale(self.weighted, 1.0 / self.measure))
        } else {
            None
        }
    }
}

/// Area, centroid and (unnormalized) Newell normal of a planar polygon in 3-D.
///
/// The polygon is fanned from its vertex mean, which is exact for convex
/// faces and is what the mesh builder assumes.
pub fn polygon_metrics(points: &[Vec3]) -> (f64, Vec3, Vec3) {
    let center = mean(points.iter().copied());
    let mut acc = CentroidAccumulator::new();
    let mut newell = ZERO;
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc.push_triangle(center, a, b);
        newell = add(newell, cross(sub(a, center), sub(b, center)));
    }
    let centroid = acc.centroid().unwrap_or(center);
    (acc.measure(), centroid, newell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cross_and_dot() {
        let c = cross([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(c, [0.0, 0.0, 1.0]);
        assert_eq!(dot([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn test_simplex_measures() {
        let o = ZERO;
        assert_relative_eq!(triangle_area(o, [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]), 0.5);
        assert_relative_eq!(
            tetrahedron_volume(o, [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            1.0 / 6.0
        );
    }

    #[test]
    fn test_unit_square_polygon() {
        let square = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let (area, centroid, normal) = polygon_metrics(&square);
        assert_relative_eq!(area, 1.0, epsilon = 1e-14);
        assert_relative_eq!(centroid[0], 0.5, epsilon = 1e-14);
        assert_relative_eq!(centroid[1], 0.5, epsilon = 1e-14);
        assert!(normal[2] > 0.0);
    }

    #[test]
    fn test_empty_accumulator() {
        assert!(CentroidAccumulator::new().centroid().is_none());
    }
}
