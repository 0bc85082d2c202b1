//! Path triangulation.
//!
//! Flattened contours are filled with the non-zero winding rule: each
//! contour is classified as the outer boundary of a filled region, a hole
//! in one, or an edge between two regions of equal fill. Every filled
//! region is then ear-clipped together with its holes using earcutr.

use h3d_core::{Result, TessellationConfig, Tolerance, Validate};
use h3d_math::DVec2;
use h3d_mesh::{Attribute, MeshBuffer, MeshBuilder, Primitive, PrimitiveType};
use rayon::prelude::*;

use crate::flatten::flatness_config;
use crate::path::CurvePath;

/// A filled region: one outer boundary plus the holes cut from it.
#[derive(Debug, Clone)]
struct Region {
    outer: Vec<DVec2>,
    holes: Vec<Vec<DVec2>>,
}

/// Twice the signed area; positive for counterclockwise contours.
fn signed_area2(points: &[DVec2]) -> f64 {
    let n = points.len();
    (0..n).map(|i| points[i].perp_dot(points[(i + 1) % n])).sum()
}

/// Winding number of the closed polygon `points` around `p`.
fn winding_number(points: &[DVec2], p: DVec2) -> i32 {
    let n = points.len();
    let mut wn = 0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let side = (b - a).perp_dot(p - a);
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                wn += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            wn -= 1;
        }
    }
    wn
}

/// A point strictly inside `points`, near its first vertex. Falls back to
/// the first vertex when no nearby interior point is found.
fn interior_sample(points: &[DVec2], area2: f64) -> DVec2 {
    let n = points.len();
    let orientation = area2.signum();
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];
        // convex corner: its inward bisector points into the contour
        if (cur - prev).perp_dot(next - cur) * orientation <= 0.0 {
            continue;
        }
        let centroid = (prev + cur + next) / 3.0;
        for shrink in [1.0, 0.1, 0.01] {
            let p = cur.lerp(centroid, shrink);
            if winding_number(points, p) != 0 {
                return p;
            }
        }
    }
    points[0]
}

fn prepare(mut contour: Vec<DVec2>) -> Option<(Vec<DVec2>, f64)> {
    if contour.len() > 1 && contour.first() == contour.last() {
        contour.pop();
    }
    let area2 = if contour.len() >= 3 {
        signed_area2(&contour)
    } else {
        0.0
    };
    if Tolerance::default_precision().is_zero(area2) {
        log::warn!(
            "dropping degenerate contour with {} points (area {area2})",
            contour.len()
        );
        return None;
    }
    Some((contour, area2))
}

/// Split contours into filled regions with the non-zero winding rule.
fn classify(contours: Vec<Vec<DVec2>>) -> Vec<Region> {
    let prepared: Vec<(Vec<DVec2>, f64)> = contours.into_iter().filter_map(prepare).collect();
    let samples: Vec<DVec2> = prepared
        .iter()
        .map(|(points, area2)| interior_sample(points, *area2))
        .collect();

    let mut outers: Vec<usize> = Vec::new();
    let mut holes: Vec<usize> = Vec::new();
    for (i, (points, area2)) in prepared.iter().enumerate() {
        // winding just outside contour i, from every contour enclosing it
        let outside: i32 = prepared
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, (other, _))| winding_number(other, points[0]))
            .sum();
        let inside = outside + if *area2 > 0.0 { 1 } else { -1 };
        match (outside != 0, inside != 0) {
            (false, true) => outers.push(i),
            (true, false) => holes.push(i),
            _ => log::trace!("contour {i} separates regions of equal fill, skipped"),
        }
    }

    let mut regions: Vec<Region> = outers
        .iter()
        .map(|&i| Region {
            outer: prepared[i].0.clone(),
            holes: Vec::new(),
        })
        .collect();
    for &h in &holes {
        // the smallest enclosing outer boundary owns the hole
        let owner = outers
            .iter()
            .enumerate()
            .filter(|&(_, &o)| winding_number(&prepared[o].0, samples[h]) != 0)
            .min_by(|&(_, &a), &(_, &b)| prepared[a].1.abs().total_cmp(&prepared[b].1.abs()))
            .map(|(k, _)| k);
        match owner {
            Some(k) => regions[k].holes.push(prepared[h].0.clone()),
            None => log::warn!("hole contour {h} has no enclosing boundary, skipped"),
        }
    }
    regions
}

fn fan(points: &[DVec2]) -> Vec<[DVec2; 3]> {
    (1..points.len().saturating_sub(1))
        .map(|i| [points[0], points[i], points[i + 1]])
        .collect()
}

fn triangulate_region(index: usize, region: &Region) -> Vec<[DVec2; 3]> {
    let mut vertices = region.outer.clone();
    let mut hole_indices = Vec::with_capacity(region.holes.len());
    for hole in &region.holes {
        hole_indices.push(vertices.len());
        vertices.extend_from_slice(hole);
    }
    let coords: Vec<f64> = vertices.iter().flat_map(|p| [p.x, p.y]).collect();
    log::trace!(
        "region {index}: {} vertices, {} holes",
        vertices.len(),
        region.holes.len()
    );

    let triangles: Vec<[DVec2; 3]> = match earcutr::earcut(&coords, &hole_indices, 2) {
        Ok(indices) if !indices.is_empty() => indices
            .chunks_exact(3)
            .map(|t| [vertices[t[0]], vertices[t[1]], vertices[t[2]]])
            .collect(),
        _ => {
            log::warn!("ear clipping failed for region {index}, using a fan over its boundary");
            fan(&region.outer)
        }
    };
    triangles
        .into_iter()
        .map(|[a, b, c]| {
            if (b - a).perp_dot(c - a) < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect()
}

impl CurvePath {
    /// Triangles covering the path's non-zero fill, all counterclockwise.
    /// Curves are flattened to within `flatness` first. Empty for paths
    /// without area.
    pub fn get_triangles(&self, flatness: f64) -> Vec<[DVec2; 3]> {
        self.triangles_unchecked(&flatness_config(flatness))
    }

    /// # Errors
    /// `InvalidParameter` if `config` does not validate.
    pub fn get_triangles_with(&self, config: &TessellationConfig) -> Result<Vec<[DVec2; 3]>> {
        config.validate()?;
        Ok(self.triangles_unchecked(config))
    }

    fn triangles_unchecked(&self, config: &TessellationConfig) -> Vec<[DVec2; 3]> {
        let regions = classify(self.flatten_unchecked(config));
        regions
            .par_iter()
            .enumerate()
            .map(|(i, region)| triangulate_region(i, region))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// The path's fill as a triangle mesh in the plane `z`, with `+Z`
    /// normals.
    pub fn to_mesh_buffer(&self, flatness: f64, z: f64) -> MeshBuffer {
        self.mesh_unchecked(&flatness_config(flatness), z)
    }

    /// # Errors
    /// `InvalidParameter` if `config` does not validate.
    pub fn to_mesh_buffer_with(&self, config: &TessellationConfig, z: f64) -> Result<MeshBuffer> {
        config.validate()?;
        Ok(self.mesh_unchecked(config, z))
    }

    fn mesh_unchecked(&self, config: &TessellationConfig, z: f64) -> MeshBuffer {
        let mut builder = MeshBuilder::new();
        builder.mode(Primitive::Triangles).normal3(0.0, 0.0, 1.0);
        for tri in self.triangles_unchecked(config) {
            for p in tri {
                builder.vertex3(p.x, p.y, z);
            }
        }
        builder
            .to_mesh_buffers()
            .into_iter()
            .next()
            .unwrap_or_else(|| MeshBuffer::empty(PrimitiveType::Triangles, &[Attribute::NORMAL]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn area(triangles: &[[DVec2; 3]]) -> f64 {
        triangles.iter().map(|t| signed_area2(t) / 2.0).sum()
    }

    fn square(path: &mut CurvePath, x: f64, y: f64, size: f64, ccw: bool) {
        path.move_to(x, y);
        if ccw {
            path.line_to(x + size, y).line_to(x + size, y + size).line_to(x, y + size);
        } else {
            path.line_to(x, y + size).line_to(x + size, y + size).line_to(x + size, y);
        }
        path.close_path();
    }

    #[test]
    fn test_winding_number() {
        let sq = [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y];
        assert_eq!(winding_number(&sq, DVec2::splat(0.5)), 1);
        let cw: Vec<DVec2> = sq.iter().rev().copied().collect();
        assert_eq!(winding_number(&cw, DVec2::splat(0.5)), -1);
        assert_eq!(winding_number(&sq, DVec2::new(2.0, 0.5)), 0);
    }

    #[test]
    fn test_interior_sample_of_concave_contour() {
        // an L shape whose first corner is reflex
        let l = vec![
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 2.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 1.0),
        ];
        let area2 = signed_area2(&l);
        let p = interior_sample(&l, area2);
        assert_ne!(winding_number(&l, p), 0);
    }

    #[test]
    fn test_square_has_two_ccw_triangles() {
        let mut path = CurvePath::new();
        square(&mut path, 0.0, 0.0, 2.0, false);
        let tris = path.get_triangles(0.1);
        assert_eq!(tris.len(), 2);
        assert!(tris.iter().all(|t| signed_area2(t) > 0.0));
        assert_abs_diff_eq!(area(&tris), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_opposite_winding_makes_a_hole() {
        let mut path = CurvePath::new();
        square(&mut path, 0.0, 0.0, 10.0, true);
        square(&mut path, 3.0, 3.0, 4.0, false);
        let tris = path.get_triangles(0.1);
        assert_abs_diff_eq!(area(&tris), 84.0, epsilon = 1e-9);
    }

    #[test]
    fn test_same_winding_fills_nested_square() {
        let mut path = CurvePath::new();
        square(&mut path, 0.0, 0.0, 10.0, true);
        square(&mut path, 3.0, 3.0, 4.0, true);
        let tris = path.get_triangles(0.1);
        assert_abs_diff_eq!(area(&tris), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_disjoint_regions() {
        let mut path = CurvePath::new();
        square(&mut path, 0.0, 0.0, 1.0, true);
        square(&mut path, 5.0, 0.0, 2.0, false);
        let tris = path.get_triangles(0.1);
        assert_abs_diff_eq!(area(&tris), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_paths_yield_nothing() {
        let mut path = CurvePath::new();
        path.move_to(0.0, 0.0).line_to(1.0, 1.0).line_to(2.0, 2.0).close_path();
        assert!(path.get_triangles(0.1).is_empty());
        assert!(CurvePath::new().get_triangles(0.1).is_empty());
    }

    #[test]
    fn test_mesh_buffer() {
        let mut path = CurvePath::new();
        square(&mut path, 0.0, 0.0, 1.0, true);
        let mesh = path.to_mesh_buffer(0.1, 2.5);
        assert_eq!(mesh.primitive(), PrimitiveType::Triangles);
        assert_eq!(mesh.primitive_count(), 2);
        assert!(mesh.has_attribute(Attribute::NORMAL));
        let normals = mesh.attribute(Attribute::NORMAL).unwrap();
        assert!(normals.iter().all(|n| n == [0.0f32, 0.0, 1.0].as_slice()));
        assert!(mesh.positions().iter().all(|p| p.z == 2.5));

        let empty = CurvePath::new().to_mesh_buffer(0.1, 0.0);
        assert_eq!(empty.vertex_count(), 0);
        assert!(empty.has_attribute(Attribute::NORMAL));
    }

    #[test]
    fn test_configured_entry_points_validate() {
        let mut path = CurvePath::new();
        square(&mut path, 0.0, 0.0, 1.0, true);
        let deep = TessellationConfig {
            max_subdivision_depth: 40,
            ..TessellationConfig::default()
        };
        assert!(path.get_triangles_with(&deep).is_err());
        assert!(path.to_mesh_buffer_with(&deep, 0.0).is_err());

        let config = TessellationConfig::default();
        assert_eq!(path.get_triangles_with(&config).unwrap().len(), 2);
        assert_eq!(path.to_mesh_buffer_with(&config, 0.0).unwrap().primitive_count(), 2);
    }
}
