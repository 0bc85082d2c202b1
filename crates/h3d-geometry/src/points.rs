//! Validation of caller-supplied control point sets.

use h3d_core::{H3dError, Result};

/// Check that `points` is non-empty and every point has the same, non-zero
/// length. Returns that length.
pub fn point_dimension(points: &[Vec<f64>]) -> Result<usize> {
    let first = points
        .first()
        .ok_or_else(|| H3dError::Geometry("control point list is empty".into()))?;
    let dim = first.len();
    if dim == 0 {
        return Err(H3dError::Geometry("control points have no components".into()));
    }
    if let Some(i) = points.iter().position(|p| p.len() != dim) {
        return Err(H3dError::Geometry(format!(
            "control point {} has {} components, expected {}",
            i,
            points[i].len(),
            dim
        )));
    }
    Ok(dim)
}

/// Check a control point grid `grid[v][u]`: non-empty, rectangular, uniform
/// point length. Returns `(rows, columns, dimension)`.
pub fn grid_dimension(grid: &[Vec<Vec<f64>>]) -> Result<(usize, usize, usize)> {
    if grid.is_empty() {
        return Err(H3dError::Geometry("control point grid is empty".into()));
    }
    let cols = grid[0].len();
    let dim = point_dimension(&grid[0])?;
    for (j, row) in grid.iter().enumerate() {
        if row.len() != cols {
            return Err(H3dError::Geometry(format!(
                "control point row {} has {} points, expected {}",
                j,
                row.len(),
                cols
            )));
        }
        if point_dimension(row)? != dim {
            return Err(H3dError::Geometry(format!(
                "control point row {} has points of a different length",
                j
            )));
        }
    }
    Ok((grid.len(), cols, dim))
}

/// Check that a reparameterization interval is usable.
pub fn check_domain(a: f64, b: f64, axis: &str) -> Result<()> {
    if !a.is_finite() || !b.is_finite() {
        return Err(H3dError::Geometry(format!("{axis} domain must be finite")));
    }
    if a == b {
        return Err(H3dError::Geometry(format!(
            "{axis} domain is degenerate: both ends are {a}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_points_rejected() {
        let err = point_dimension(&[vec![0.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(err.to_string().contains("control point 1"));
    }

    #[test]
    fn test_grid_rectangular() {
        let grid = vec![
            vec![vec![0.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]],
            vec![vec![0.0, 1.0, 0.0], vec![1.0, 1.0, 0.0]],
        ];
        assert_eq!(grid_dimension(&grid).unwrap(), (2, 2, 3));

        let ragged = vec![vec![vec![0.0], vec![1.0]], vec![vec![2.0]]];
        assert!(grid_dimension(&ragged).is_err());
    }

    #[test]
    fn test_degenerate_domain() {
        assert!(check_domain(0.5, 0.5, "u").is_err());
        assert!(check_domain(0.0, f64::INFINITY, "u").is_err());
        assert!(check_domain(1.0, 0.0, "v").is_ok());
    }
}
