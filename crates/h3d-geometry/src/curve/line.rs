//! Straight line curve.

use h3d_math::DVec2;
use serde::{Deserialize, Serialize};

use super::CurveEvaluator;

/// `origin + t * direction` for `t` in `[0, 1]`, evaluated as `[x, y, 0]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineCurve {
    pub origin: DVec2,
    pub direction: DVec2,
}

impl LineCurve {
    pub fn new(origin: DVec2, direction: DVec2) -> Self {
        Self { origin, direction }
    }

    pub fn between(start: DVec2, end: DVec2) -> Self {
        Self::new(start, end - start)
    }
}

impl CurveEvaluator for LineCurve {
    fn evaluate(&self, t: f64) -> Vec<f64> {
        let p = self.origin + self.direction * t;
        vec![p.x, p.y, 0.0]
    }

    fn velocity(&self, _t: f64) -> Vec<f64> {
        vec![self.direction.x, self.direction.y, 0.0]
    }

    fn accel(&self, _t: f64) -> Vec<f64> {
        vec![0.0; 3]
    }

    fn arc_length(&self, t: f64) -> f64 {
        self.direction.length() * t
    }
}
