//! Tessellation settings shared by the evaluators, mesh builders and path triangulator.

use serde::{Deserialize, Serialize};

use crate::error::{H3dError, Result};
use crate::traits::Validate;

/// Sampling densities and tolerances used when turning parametric or path
/// geometry into meshes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    /// Subdivisions used when a curve is tessellated without an explicit count.
    pub curve_segments: usize,
    pub surface_u_segments: usize,
    pub surface_v_segments: usize,
    /// Maximum deviation between a flattened path and the true curve.
    pub flatness: f64,
    /// Recursion cap for adaptive flattening.
    pub max_subdivision_depth: u32,
    /// Forward-difference step for automatic surface normals.
    pub normal_step: f64,
    /// Intervals in an arc-length lookup table.
    pub arc_length_samples: usize,
}

impl TessellationConfig {
    pub const DEFAULT_SEGMENTS: usize = 24;
    pub const DEFAULT_NORMAL_STEP: f64 = 0.001;
    /// Deepest adaptive subdivision accepted; a span splits into at most
    /// `2^MAX_SUBDIVISION_DEPTH` pieces.
    pub const MAX_SUBDIVISION_DEPTH: u32 = 20;
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            curve_segments: Self::DEFAULT_SEGMENTS,
            surface_u_segments: Self::DEFAULT_SEGMENTS,
            surface_v_segments: Self::DEFAULT_SEGMENTS,
            flatness: 0.1,
            max_subdivision_depth: 12,
            normal_step: Self::DEFAULT_NORMAL_STEP,
            arc_length_samples: 256,
        }
    }
}

impl Validate for TessellationConfig {
    fn validate(&self) -> Result<()> {
        if self.curve_segments == 0 || self.surface_u_segments == 0 || self.surface_v_segments == 0 {
            return Err(H3dError::InvalidParameter(
                "segment counts must be positive".into(),
            ));
        }
        if !(self.flatness > 0.0) {
            return Err(H3dError::InvalidParameter(format!(
                "flatness must be positive, got {}",
                self.flatness
            )));
        }
        if self.max_subdivision_depth > Self::MAX_SUBDIVISION_DEPTH {
            return Err(H3dError::InvalidParameter(format!(
                "subdivision depth {} exceeds {}",
                self.max_subdivision_depth,
                Self::MAX_SUBDIVISION_DEPTH
            )));
        }
        if !(self.normal_step > 0.0) {
            return Err(H3dError::InvalidParameter(format!(
                "normal step must be positive, got {}",
                self.normal_step
            )));
        }
        if self.arc_length_samples == 0 {
            return Err(H3dError::InvalidParameter(
                "arc length table needs at least one interval".into(),
            ));
        }
        Ok(())
    }
}
