//! Catmull-Rom curve through a fixed, ordered set of control points.
//!
//! Every sliding window of four points `[p0, p1, p2, p3]` yields one segment
//! running from `p1` to `p2`; `p0` and `p3` only shape the tangents. With N
//! points there are N - 3 segments and the curve spans the second to the
//! second-to-last point.

use crate::error::{Error, Result};
use crate::types::Point;

/// Parameter step used when sampling a segment.
pub const STEP: f64 = 0.05;

/// Samples per segment at [`STEP`]: t = 0, 0.05, ..., 0.95.
pub const SAMPLES_PER_SEGMENT: usize = 20;

/// Control points of the reference camera setup.
pub const REFERENCE_CONTROL_POINTS: [Point; 6] = [
    Point::new(160, 237),
    Point::new(243, 185),
    Point::new(340, 174),
    Point::new(436, 205),
    Point::new(533, 177),
    Point::new(593, 102),
];

/// Uniform Catmull-Rom blend of four scalars at `t`.
///
/// Returns `p1` at t = 0 and `p2` at t = 1. `t` is clamped to [0, 1].
#[inline]
pub fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

/// Evaluate one 4-point window at `t`, per axis.
pub fn evaluate(window: &[Point; 4], t: f64) -> (f64, f64) {
    let [p0, p1, p2, p3] = window;
    (
        catmull_rom(p0.x.into(), p1.x.into(), p2.x.into(), p3.x.into(), t),
        catmull_rom(p0.y.into(), p1.y.into(), p2.y.into(), p3.y.into(), t),
    )
}

/// Immutable control point set; always holds at least four points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spline {
    points: Vec<Point>,
}

impl Spline {
    pub fn new(points: impl Into<Vec<Point>>) -> Result<Self> {
        let points = points.into();
        if points.len() < 4 {
            return Err(Error::TooFewControlPoints(points.len()));
        }
        Ok(Self { points })
    }

    /// The six-point reference configuration.
    pub fn reference() -> Self {
        Self { points: REFERENCE_CONTROL_POINTS.to_vec() }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// One lazily sampled segment per 4-point window (N - 3 of them).
    pub fn segments(&self) -> impl Iterator<Item = CurveSegment> + '_ {
        self.points.windows(4).map(|w| CurveSegment::new([w[0], w[1], w[2], w[3]]))
    }

    /// Pixel polyline for the whole curve: starts at the second control
    /// point, then every rounded sample of every segment in order.
    pub fn polyline(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.points[1]).chain(self.segments().flatten().map(|(x, y)| {
            Point::new(x.round() as i32, y.round() as i32)
        }))
    }
}

/// Samples of one segment at t = k * [`STEP`] for k in 0..20.
///
/// Consumed once; build a new one to walk the segment again.
#[derive(Clone, Debug)]
pub struct CurveSegment {
    window: [Point; 4],
    next: usize,
}

impl CurveSegment {
    pub fn new(window: [Point; 4]) -> Self {
        Self { window, next: 0 }
    }

    pub fn window(&self) -> &[Point; 4] {
        &self.window
    }
}

impl Iterator for CurveSegment {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= SAMPLES_PER_SEGMENT {
            return None;
        }
        let t = self.next as f64 * STEP;
        self.next += 1;
        Some(evaluate(&self.window, t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = SAMPLES_PER_SEGMENT - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for CurveSegment {}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn pts(raw: &[(i32, i32)]) -> Vec<Point> {
        raw.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn starts_exactly_at_second_point() {
        let w = [Point::new(0, 0), Point::new(1, 1), Point::new(2, 4), Point::new(3, 9)];
        assert_eq!(evaluate(&w, 0.0), (1.0, 1.0));
    }

    #[test]
    fn ends_at_third_point() {
        let w = [Point::new(0, 0), Point::new(1, 1), Point::new(2, 4), Point::new(3, 9)];
        let (x, y) = evaluate(&w, 1.0);
        assert!((x - 2.0).abs() < EPS && (y - 4.0).abs() < EPS);
    }

    #[test]
    fn out_of_range_t_is_clamped() {
        assert_eq!(catmull_rom(0.0, 1.0, 2.0, 3.0, -3.0), 1.0);
        assert_eq!(catmull_rom(0.0, 1.0, 2.0, 3.0, 7.0), catmull_rom(0.0, 1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn collinear_points_interpolate_linearly() {
        // evenly spaced points: the blend reduces to p1 + t
        for k in 0..SAMPLES_PER_SEGMENT {
            let t = k as f64 * STEP;
            assert!((catmull_rom(0.0, 1.0, 2.0, 3.0, t) - (1.0 + t)).abs() < EPS);
        }
    }

    #[test]
    fn segments_join_without_gaps() {
        let spline = Spline::reference();
        let windows: Vec<_> = spline.segments().map(|s| *s.window()).collect();
        for pair in windows.windows(2) {
            let end = evaluate(&pair[0], 1.0 - 1e-9);
            let start = evaluate(&pair[1], 0.0);
            assert!((end.0 - start.0).abs() < 1e-4, "{end:?} vs {start:?}");
            assert!((end.1 - start.1).abs() < 1e-4, "{end:?} vs {start:?}");
        }
    }

    #[test]
    fn n_points_make_n_minus_3_segments() {
        assert_eq!(Spline::reference().segments().count(), 3);
        let seven =
            Spline::new(pts(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0)])).unwrap();
        assert_eq!(seven.segments().count(), 4);
        let four = Spline::new(pts(&[(0, 0), (1, 0), (2, 0), (3, 0)])).unwrap();
        assert_eq!(four.segments().count(), 1);
    }

    #[test]
    fn fewer_than_four_points_is_rejected() {
        let err = Spline::new(pts(&[(0, 0), (1, 1), (2, 2)])).unwrap_err();
        assert!(matches!(err, Error::TooFewControlPoints(3)));
    }

    #[test]
    fn segment_yields_twenty_samples_once() {
        let mut seg = Spline::reference().segments().next().unwrap();
        assert_eq!(seg.len(), SAMPLES_PER_SEGMENT);
        assert_eq!(seg.by_ref().count(), SAMPLES_PER_SEGMENT);
        assert_eq!(seg.next(), None);
    }

    #[test]
    fn polyline_starts_at_second_point_and_passes_interior_points() {
        let spline = Spline::reference();
        let line: Vec<Point> = spline.polyline().collect();
        assert_eq!(line.len(), 1 + 3 * SAMPLES_PER_SEGMENT);
        assert_eq!(line[0], REFERENCE_CONTROL_POINTS[1]);
        // first sample of every segment is that window's p1
        for (i, p) in REFERENCE_CONTROL_POINTS[1..4].iter().enumerate() {
            assert_eq!(line[1 + i * SAMPLES_PER_SEGMENT], *p);
        }
    }
}
