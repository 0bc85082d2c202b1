//! Composition of parametric channels into mesh vertices.
//!
//! A [`CurveEval`] or [`SurfaceEval`] holds one evaluator for positions and
//! optional evaluators for normals, colors and texture coordinates. All
//! channels are evaluated at the same parameters and emitted together as one
//! builder vertex.

use h3d_core::{H3dError, Result, TessellationConfig, Tolerance, Validate};
use h3d_geometry::{BezierCurve, BezierSurface, CurveEvaluator, SurfaceEvaluator};
use h3d_math::vector::{component, to_dvec3};
use h3d_math::DVec3;

use crate::builder::{MeshBuilder, Primitive};
use crate::semantic::PrimitiveType;

type CurveChannel<'a> = Box<dyn CurveEvaluator + 'a>;
type SurfaceChannel<'a> = Box<dyn SurfaceEvaluator + 'a>;

/// Writes optional channel values into the builder's current state.
fn apply_channels(mesh: &mut MeshBuilder, normal: Option<&[f64]>, color: Option<&[f64]>, tex: Option<&[f64]>) {
    if let Some(n) = normal {
        mesh.normal3(component(n, 0), component(n, 1), component(n, 2));
    }
    if let Some(c) = color {
        mesh.color3(component(c, 0), component(c, 1), component(c, 2));
    }
    if let Some(t) = tex {
        mesh.tex_coord2(component(t, 0), component(t, 1));
    }
}

fn emit_position(mesh: &mut MeshBuilder, p: &[f64]) {
    mesh.vertex3(component(p, 0), component(p, 1), component(p, 2));
}

fn check_count(name: &str, n: usize) -> Result<()> {
    if n == 0 {
        return Err(H3dError::InvalidParameter(format!("{name} must be at least 1")));
    }
    Ok(())
}

/// Parameter `i` of `n` evenly spaced steps over `[a, b]`.
fn step(a: f64, b: f64, i: usize, n: usize) -> f64 {
    a + (b - a) * i as f64 / n as f64
}

/// Curve tessellator over lockstep channels.
pub struct CurveEval<'a> {
    vertex: CurveChannel<'a>,
    normal: Option<CurveChannel<'a>>,
    color: Option<CurveChannel<'a>>,
    tex_coord: Option<CurveChannel<'a>>,
}

impl<'a> CurveEval<'a> {
    pub fn new(vertex: impl CurveEvaluator + 'a) -> Self {
        Self {
            vertex: Box::new(vertex),
            normal: None,
            color: None,
            tex_coord: None,
        }
    }

    /// Positions from a Bezier curve through `control_points`.
    pub fn bezier(control_points: Vec<Vec<f64>>) -> Result<Self> {
        Ok(Self::new(BezierCurve::new(control_points)?))
    }

    pub fn with_normal(mut self, normal: impl CurveEvaluator + 'a) -> Self {
        self.normal = Some(Box::new(normal));
        self
    }

    pub fn with_color(mut self, color: impl CurveEvaluator + 'a) -> Self {
        self.color = Some(Box::new(color));
        self
    }

    /// One- or two-component texture coordinates; a single value gets
    /// `v = 0`.
    pub fn with_tex_coord(mut self, tex_coord: impl CurveEvaluator + 'a) -> Self {
        self.tex_coord = Some(Box::new(tex_coord));
        self
    }

    /// Domain of the position channel.
    pub fn end_points(&self) -> (f64, f64) {
        self.vertex.end_points()
    }

    /// Emit one vertex at `u`. The builder's current attribute values are
    /// unchanged afterwards.
    pub fn eval_one(&self, mesh: &mut MeshBuilder, u: f64) {
        let saved = mesh.state();
        apply_channels(
            mesh,
            self.normal.as_ref().map(|c| c.evaluate(u)).as_deref(),
            self.color.as_ref().map(|c| c.evaluate(u)).as_deref(),
            self.tex_coord.as_ref().map(|c| c.evaluate(u)).as_deref(),
        );
        emit_position(mesh, &self.vertex.evaluate(u));
        mesh.restore(saved);
    }

    /// Emit `n + 1` evenly spaced samples over `[u1, u2]` as a line strip
    /// (`Lines`/`LineStrip`) or points (`Points`). Triangle modes emit
    /// nothing.
    ///
    /// # Errors
    /// Fails if `n` is zero.
    pub fn eval_curve(&self, mesh: &mut MeshBuilder, mode: Primitive, n: usize, u1: f64, u2: f64) -> Result<()> {
        check_count("curve segment count", n)?;
        let batch = match mode {
            Primitive::Lines | Primitive::LineStrip => Primitive::LineStrip,
            Primitive::Points => Primitive::Points,
            _ => {
                log::trace!("curve tessellation ignores {mode:?}");
                return Ok(());
            }
        };
        mesh.mode(batch);
        for i in 0..=n {
            self.eval_one(mesh, step(u1, u2, i, n));
        }
        Ok(())
    }

    /// [`eval_curve`](Self::eval_curve) over the position channel's domain
    /// with `config.curve_segments` segments.
    ///
    /// # Errors
    /// Fails if `config` does not validate.
    pub fn eval_curve_default(&self, mesh: &mut MeshBuilder, mode: Primitive, config: &TessellationConfig) -> Result<()> {
        config.validate()?;
        let (u1, u2) = self.end_points();
        self.eval_curve(mesh, mode, config.curve_segments, u1, u2)
    }
}

/// Surface tessellator over lockstep channels, with optional automatic
/// normals.
pub struct SurfaceEval<'a> {
    vertex: SurfaceChannel<'a>,
    normal: Option<SurfaceChannel<'a>>,
    color: Option<SurfaceChannel<'a>>,
    tex_coord: Option<SurfaceChannel<'a>>,
    auto_normal: bool,
    normal_step: f64,
}

impl<'a> SurfaceEval<'a> {
    pub fn new(vertex: impl SurfaceEvaluator + 'a) -> Self {
        Self {
            vertex: Box::new(vertex),
            normal: None,
            color: None,
            tex_coord: None,
            auto_normal: false,
            normal_step: TessellationConfig::DEFAULT_NORMAL_STEP,
        }
    }

    /// Positions from a Bezier patch with control grid `grid[v][u]`.
    pub fn bezier(grid: Vec<Vec<Vec<f64>>>) -> Result<Self> {
        Ok(Self::new(BezierSurface::new(grid)?))
    }

    pub fn with_normal(mut self, normal: impl SurfaceEvaluator + 'a) -> Self {
        self.normal = Some(Box::new(normal));
        self
    }

    pub fn with_color(mut self, color: impl SurfaceEvaluator + 'a) -> Self {
        self.color = Some(Box::new(color));
        self
    }

    pub fn with_tex_coord(mut self, tex_coord: impl SurfaceEvaluator + 'a) -> Self {
        self.tex_coord = Some(Box::new(tex_coord));
        self
    }

    /// Estimate normals from the position channel when no normal channel is
    /// set.
    pub fn with_auto_normal(mut self, enabled: bool) -> Self {
        self.auto_normal = enabled;
        self
    }

    /// Take the automatic-normal step from `config`.
    ///
    /// # Errors
    /// Fails if `config` does not validate.
    pub fn with_config(mut self, config: &TessellationConfig) -> Result<Self> {
        config.validate()?;
        self.normal_step = config.normal_step;
        Ok(self)
    }

    pub fn end_points(&self) -> [f64; 4] {
        self.vertex.end_points()
    }

    /// Unit normal of the position channel at `(u, v)`.
    ///
    /// Uses the surface's analytic gradient when it has one. Otherwise
    /// crosses forward-difference partials; when one partial vanishes the
    /// other is used as the normal, and when both vanish there is no
    /// estimate.
    pub fn estimate_normal(&self, u: f64, v: f64) -> Option<DVec3> {
        if let Some(g) = self.vertex.gradient(u, v) {
            if let Some(n) = to_dvec3(&g).try_normalize() {
                return Some(n);
            }
        }
        let h = self.normal_step;
        let p = to_dvec3(&self.vertex.evaluate(u, v));
        let du = to_dvec3(&self.vertex.evaluate(u + h, v)) - p;
        let dv = to_dvec3(&self.vertex.evaluate(u, v + h)) - p;
        let tol = Tolerance::loose();
        match (tol.is_zero(du.length()), tol.is_zero(dv.length())) {
            (false, false) => du.cross(dv).try_normalize(),
            (true, false) => dv.try_normalize(),
            (false, true) => du.try_normalize(),
            (true, true) => None,
        }
    }

    /// Emit one vertex at `(u, v)`; the builder's current attribute values
    /// are unchanged afterwards.
    pub fn eval_one(&self, mesh: &mut MeshBuilder, u: f64, v: f64) {
        self.emit(mesh, u, v, None);
    }

    /// Emits one vertex and returns the normal it carried, so a sweep can
    /// reuse it where the next estimate degenerates.
    fn emit(&self, mesh: &mut MeshBuilder, u: f64, v: f64, previous: Option<DVec3>) -> Option<DVec3> {
        let saved = mesh.state();
        let normal = match &self.normal {
            Some(channel) => Some(to_dvec3(&channel.evaluate(u, v))),
            None if self.auto_normal => self.estimate_normal(u, v).or(previous),
            None => None,
        };
        let normal_vec = normal.map(|n| vec![n.x, n.y, n.z]);
        apply_channels(
            mesh,
            normal_vec.as_deref(),
            self.color.as_ref().map(|c| c.evaluate(u, v)).as_deref(),
            self.tex_coord.as_ref().map(|c| c.evaluate(u, v)).as_deref(),
        );
        emit_position(mesh, &self.vertex.evaluate(u, v));
        mesh.restore(saved);
        normal
    }

    /// Tessellate `[u1, u2] x [v1, v2]` on a `(un + 1) x (vn + 1)` grid.
    ///
    /// Triangle modes emit one triangle strip per grid row (`2 * un`
    /// triangles each, `un * vn * 2` in total). Line modes emit a wireframe
    /// of line strips along both parameter directions. `Points` emits every
    /// grid sample.
    ///
    /// # Errors
    /// Fails if `un` or `vn` is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn eval_surface(
        &self,
        mesh: &mut MeshBuilder,
        mode: Primitive,
        un: usize,
        vn: usize,
        u1: f64,
        u2: f64,
        v1: f64,
        v2: f64,
    ) -> Result<()> {
        check_count("u segment count", un)?;
        check_count("v segment count", vn)?;
        log::debug!("tessellating surface on a {un}x{vn} grid as {mode:?}");
        let u = |i| step(u1, u2, i, un);
        let v = |j| step(v1, v2, j, vn);
        let mut prev = None;

        match mode.output() {
            PrimitiveType::Triangles => {
                for j in 0..vn {
                    mesh.mode(Primitive::TriangleStrip);
                    for i in 0..=un {
                        prev = self.emit(mesh, u(i), v(j + 1), prev);
                        prev = self.emit(mesh, u(i), v(j), prev);
                    }
                }
            }
            PrimitiveType::Lines => {
                for j in 0..=vn {
                    mesh.mode(Primitive::LineStrip);
                    for i in 0..=un {
                        prev = self.emit(mesh, u(i), v(j), prev);
                    }
                }
                for i in 0..=un {
                    mesh.mode(Primitive::LineStrip);
                    for j in 0..=vn {
                        prev = self.emit(mesh, u(i), v(j), prev);
                    }
                }
            }
            PrimitiveType::Points => {
                mesh.mode(Primitive::Points);
                for j in 0..=vn {
                    for i in 0..=un {
                        prev = self.emit(mesh, u(i), v(j), prev);
                    }
                }
            }
        }
        Ok(())
    }

    /// [`eval_surface`](Self::eval_surface) over the position channel's
    /// domain with the configured segment counts.
    pub fn eval_surface_default(&self, mesh: &mut MeshBuilder, mode: Primitive, config: &TessellationConfig) -> Result<()> {
        config.validate()?;
        let [u1, u2, v1, v2] = self.end_points();
        self.eval_surface(
            mesh,
            mode,
            config.surface_u_segments,
            config.surface_v_segments,
            u1,
            u2,
            v1,
            v2,
        )
    }
}
