//! Curve flattening: paths to polylines within a flatness tolerance.

use h3d_core::{Result, TessellationConfig, Tolerance, Validate};
use h3d_geometry::sample::adaptive_polyline;
use h3d_geometry::CurveEvaluator;
use h3d_math::DVec2;

use crate::path::CurvePath;
use crate::segment::Segment;

/// A single path segment seen as a planar curve over `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct SegmentCurve(pub Segment);

impl CurveEvaluator for SegmentCurve {
    fn evaluate(&self, u: f64) -> Vec<f64> {
        let p = self.0.point(u).unwrap_or_default();
        vec![p.x, p.y]
    }
}

/// Default tessellation settings with `flatness`; non-positive or NaN
/// flatness falls back to the default linear precision.
pub(crate) fn flatness_config(flatness: f64) -> TessellationConfig {
    let flatness = if flatness > 0.0 {
        flatness
    } else {
        Tolerance::default_precision().linear
    };
    TessellationConfig {
        flatness,
        ..TessellationConfig::default()
    }
}

/// Append `p` unless it repeats the last point.
fn push_point(contour: &mut Vec<DVec2>, p: DVec2) {
    if contour.last() != Some(&p) {
        contour.push(p);
    }
}

impl CurvePath {
    /// Flatten every subpath into a polyline whose distance from the true
    /// curve stays within `flatness`. Lines contribute their endpoints only.
    ///
    /// Closed subpaths do not repeat their first point at the end.
    pub fn flatten(&self, flatness: f64) -> Vec<Vec<DVec2>> {
        self.flatten_unchecked(&flatness_config(flatness))
    }

    /// [`flatten`](Self::flatten) with the flatness and recursion cap of
    /// `config`.
    ///
    /// # Errors
    /// `InvalidParameter` if `config` does not validate.
    pub fn flatten_with(&self, config: &TessellationConfig) -> Result<Vec<Vec<DVec2>>> {
        config.validate()?;
        Ok(self.flatten_unchecked(config))
    }

    pub(crate) fn flatten_unchecked(&self, config: &TessellationConfig) -> Vec<Vec<DVec2>> {
        let mut contours = Vec::new();
        let mut current: Vec<DVec2> = Vec::new();
        let mut pen: Option<DVec2> = None;

        for seg in self.segments() {
            let Some(from) = seg.start() else {
                // close: drop the duplicated start point and finish the contour
                if current.len() > 1 && current.first() == current.last() {
                    current.pop();
                }
                finish(&mut contours, &mut current);
                pen = None;
                continue;
            };
            if pen != Some(from) {
                finish(&mut contours, &mut current);
                current.push(from);
            }
            match seg {
                Segment::Line { to, .. } => push_point(&mut current, *to),
                curved => {
                    let (_, points) = adaptive_polyline(
                        &SegmentCurve(*curved),
                        config.flatness,
                        config.max_subdivision_depth,
                    );
                    for p in points.iter().skip(1) {
                        push_point(&mut current, DVec2::new(p[0], p[1]));
                    }
                }
            }
            pen = seg.end();
        }
        finish(&mut contours, &mut current);
        contours
    }
}

fn finish(contours: &mut Vec<Vec<DVec2>>, current: &mut Vec<DVec2>) {
    if current.len() > 1 {
        contours.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lines_keep_their_vertices() {
        let mut path = CurvePath::new();
        path.move_to(0.0, 0.0)
            .line_to(1.0, 0.0)
            .line_to(1.0, 1.0)
            .close_path();
        let contours = path.flatten(0.1);
        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0],
            vec![DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0)]
        );
    }

    #[test]
    fn test_subpaths_split() {
        let mut path = CurvePath::new();
        path.move_to(0.0, 0.0)
            .line_to(1.0, 0.0)
            .move_to(5.0, 5.0)
            .line_to(6.0, 5.0)
            .line_to(6.0, 6.0);
        let contours = path.flatten(0.1);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[1].len(), 3);
        assert_eq!(contours[1][0], DVec2::new(5.0, 5.0));
    }

    #[test]
    fn test_quad_within_flatness() {
        let mut path = CurvePath::new();
        path.move_to(0.0, 0.0).quad_to(5.0, 10.0, 10.0, 0.0);
        let flatness = 0.05;
        let contours = path.flatten(flatness);
        let pts = &contours[0];
        assert!(pts.len() > 4);
        assert_eq!(pts[0], DVec2::ZERO);
        assert_eq!(*pts.last().unwrap(), DVec2::new(10.0, 0.0));
        // y = 2x - x^2/5 is the exact curve; chord midpoints stay close to it
        for w in pts.windows(2) {
            let mid = (w[0] + w[1]) * 0.5;
            let exact = 2.0 * mid.x - mid.x * mid.x / 5.0;
            assert!((exact - mid.y).abs() < 4.0 * flatness);
        }
    }

    #[test]
    fn test_arc_flattens_onto_circle() {
        let mut path = CurvePath::new();
        path.move_to(1.0, 0.0).arc_svg_to(1.0, 1.0, 0.0, false, true, -1.0, 0.0);
        let contours = path.flatten(0.01);
        for p in &contours[0] {
            assert_abs_diff_eq!(p.length(), 1.0, epsilon = 1e-9);
            assert!(p.y >= -1e-12);
        }
    }

    #[test]
    fn test_flatten_with_rejects_bad_config() {
        let mut path = CurvePath::new();
        path.move_to(0.0, 0.0).quad_to(5.0, 10.0, 10.0, 0.0);
        let runaway = TessellationConfig {
            flatness: 0.0,
            max_subdivision_depth: 40,
            ..TessellationConfig::default()
        };
        assert!(path.flatten_with(&runaway).is_err());

        let config = TessellationConfig {
            flatness: 0.05,
            ..TessellationConfig::default()
        };
        assert_eq!(path.flatten_with(&config).unwrap(), path.flatten(0.05));
    }

    #[test]
    fn test_zero_flatness_terminates() {
        let mut path = CurvePath::new();
        path.move_to(0.0, 0.0).cubic_to(0.0, 10.0, 10.0, 10.0, 10.0, 0.0);
        let contours = path.flatten(0.0);
        let bound = 1usize << TessellationConfig::default().max_subdivision_depth;
        assert!(contours[0].len() <= bound + 1);
        assert_eq!(*contours[0].last().unwrap(), DVec2::new(10.0, 0.0));
    }

    #[test]
    fn test_empty_path() {
        assert!(CurvePath::new().flatten(0.1).is_empty());
    }
}
