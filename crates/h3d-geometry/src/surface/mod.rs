//! Surface evaluator trait and generic surfaces.

mod ruled;

use std::sync::Arc;

pub use ruled::{ruled_surface, RuledSurface};

/// A parametric surface `(u, v) -> R^k`.
pub trait SurfaceEvaluator: Send + Sync {
    /// Point on the surface at `(u, v)`.
    fn evaluate(&self, u: f64, v: f64) -> Vec<f64>;

    /// Parameter domain `[u_start, u_end, v_start, v_end]`.
    fn end_points(&self) -> [f64; 4] {
        [0.0, 1.0, 0.0, 1.0]
    }

    /// Un-normalized surface normal direction at `(u, v)`, when the surface
    /// can compute it analytically. `None` lets callers estimate it.
    fn gradient(&self, _u: f64, _v: f64) -> Option<Vec<f64>> {
        None
    }
}

macro_rules! forward_surface_evaluator {
    ($($ty:ty),*) => {$(
        impl<S: SurfaceEvaluator + ?Sized> SurfaceEvaluator for $ty {
            fn evaluate(&self, u: f64, v: f64) -> Vec<f64> {
                (**self).evaluate(u, v)
            }
            fn end_points(&self) -> [f64; 4] {
                (**self).end_points()
            }
            fn gradient(&self, u: f64, v: f64) -> Option<Vec<f64>> {
                (**self).gradient(u, v)
            }
        }
    )*};
}

forward_surface_evaluator!(Box<S>, Arc<S>, &S);

/// Adapts a closure `(u, v) -> Vec<f64>` into a [`SurfaceEvaluator`].
#[derive(Clone)]
pub struct FnSurface<F> {
    func: F,
    ends: [f64; 4],
}

impl<F> FnSurface<F>
where
    F: Fn(f64, f64) -> Vec<f64> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            ends: [0.0, 1.0, 0.0, 1.0],
        }
    }

    pub fn with_end_points(mut self, u1: f64, u2: f64, v1: f64, v2: f64) -> Self {
        self.ends = [u1, u2, v1, v2];
        self
    }
}

impl<F> SurfaceEvaluator for FnSurface<F>
where
    F: Fn(f64, f64) -> Vec<f64> + Send + Sync,
{
    fn evaluate(&self, u: f64, v: f64) -> Vec<f64> {
        (self.func)(u, v)
    }

    fn end_points(&self) -> [f64; 4] {
        self.ends
    }
}
