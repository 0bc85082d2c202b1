//! Helpers for variable-length numeric vectors (`&[f64]`), the value type
//! produced by evaluators whose dimensionality is only known at runtime.
//!
//! Each operation comes as an allocating function and, where useful, an
//! `_in_place` variant that mutates the caller's buffer.

use crate::{DVec2, DVec3};

pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

pub fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

pub fn scale(a: &[f64], s: f64) -> Vec<f64> {
    a.iter().map(|x| x * s).collect()
}

pub fn scale_in_place(a: &mut [f64], s: f64) {
    for x in a {
        *x *= s;
    }
}

/// `a += b * s`, over the shorter of the two lengths.
pub fn add_scaled_in_place(a: &mut [f64], b: &[f64], s: f64) {
    for (x, y) in a.iter_mut().zip(b) {
        *x += y * s;
    }
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn length(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Normalize `a`; a zero vector is left unchanged.
pub fn normalize_in_place(a: &mut [f64]) {
    let len = length(a);
    if len != 0.0 {
        scale_in_place(a, 1.0 / len);
    }
}

pub fn normalize(a: &[f64]) -> Vec<f64> {
    let mut out = a.to_vec();
    normalize_in_place(&mut out);
    out
}

/// Linear interpolation between equal-length vectors.
pub fn lerp(a: &[f64], b: &[f64], t: f64) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + (y - x) * t).collect()
}

/// Component `i` of `a`, or 0 when `a` is shorter.
#[inline]
pub fn component(a: &[f64], i: usize) -> f64 {
    a.get(i).copied().unwrap_or(0.0)
}

/// First two components of `a`, zero-padded.
pub fn to_dvec2(a: &[f64]) -> DVec2 {
    DVec2::new(component(a, 0), component(a, 1))
}

/// First three components of `a`, zero-padded.
pub fn to_dvec3(a: &[f64]) -> DVec3 {
    DVec3::new(component(a, 0), component(a, 1), component(a, 2))
}

/// Copy of `a` resized to `len`, truncating or padding with zeros.
pub fn resized(a: &[f64], len: usize) -> Vec<f64> {
    let mut out = a.to_vec();
    out.resize(len, 0.0);
    out
}

/// Normalize `v`, or return `fallback` when `v` is shorter than `eps`.
pub fn normalize_or(v: DVec3, eps: f64, fallback: DVec3) -> DVec3 {
    let len = v.length();
    if len < eps {
        fallback
    } else {
        v / len
    }
}
