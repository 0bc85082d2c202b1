use approx::assert_abs_diff_eq;
use h3d_geometry::curve::derived::{evolute, inverse_curve};
use h3d_geometry::curve::roulette::{hypotrochoid, trochoid};
use h3d_geometry::curve::Circle;
use h3d_geometry::sample::{adaptive_polyline, sample_curve};
use h3d_geometry::{
    BSplineCurve, BSplineSurface, BezierCurve, BezierSurface, CurveEvaluator, SurfaceEvaluator,
};
use h3d_math::DVec2;

fn arch() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 0.0],
        vec![0.0, 10.0],
        vec![10.0, 10.0],
        vec![10.0, 0.0],
    ]
}

#[test]
fn test_bezier_matches_clamped_bspline() {
    let bezier = BezierCurve::new(arch()).unwrap();
    let spline = BSplineCurve::clamped(arch(), 3).unwrap();
    for i in 0..=10 {
        let t = i as f64 / 10.0;
        let a = bezier.evaluate(t);
        let b = spline.evaluate(t);
        assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-9);
        assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-9);
    }
}

#[test]
fn test_bezier_arc_length_by_sampling() {
    let bezier = BezierCurve::new(arch()).unwrap();
    let pts = sample_curve(&bezier, 2000).unwrap();
    let polyline: f64 = pts
        .windows(2)
        .map(|w| (w[1][0] - w[0][0]).hypot(w[1][1] - w[0][1]))
        .sum();
    assert_abs_diff_eq!(bezier.arc_length(1.0), polyline, epsilon = 1e-3);
}

#[test]
fn test_bilinear_bezier_surface_gradient_is_up() {
    let patch = BezierSurface::new(vec![
        vec![vec![0.0, 0.0, 0.0], vec![2.0, 0.0, 0.0]],
        vec![vec![0.0, 2.0, 0.0], vec![2.0, 2.0, 0.0]],
    ])
    .unwrap();
    let p = patch.evaluate(0.5, 0.5);
    assert_abs_diff_eq!(p[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(p[1], 1.0, epsilon = 1e-12);
    let n = patch.gradient(0.25, 0.75).unwrap();
    assert_abs_diff_eq!(n[0], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(n[1], 0.0, epsilon = 1e-12);
    assert!(n[2] > 0.0);
}

fn dome() -> Vec<Vec<Vec<f64>>> {
    (0..3)
        .map(|v| {
            (0..3)
                .map(|u| {
                    let h = if u == 1 && v == 1 { 4.0 } else { 0.0 };
                    vec![u as f64, v as f64, h]
                })
                .collect()
        })
        .collect()
}

fn round_trip<T: serde::Serialize + serde::de::DeserializeOwned>(value: &T) -> T {
    let json = serde_json::to_string(value).unwrap();
    serde_json::from_str(&json).unwrap()
}

fn assert_same_curve(a: &impl CurveEvaluator, b: &impl CurveEvaluator) {
    for i in 0..=8 {
        let t = i as f64 / 8.0;
        assert_eq!(a.evaluate(t), b.evaluate(t));
    }
}

fn assert_same_surface(a: &impl SurfaceEvaluator, b: &impl SurfaceEvaluator) {
    for i in 0..=4 {
        for j in 0..=4 {
            let (u, v) = (i as f64 / 4.0, j as f64 / 4.0);
            assert_eq!(a.evaluate(u, v), b.evaluate(u, v));
        }
    }
}

#[test]
fn test_curves_survive_json() {
    let bezier = BezierCurve::new(arch()).unwrap();
    assert_same_curve(&round_trip(&bezier), &bezier);

    let spline = BSplineCurve::clamped(arch(), 2).unwrap();
    assert_same_curve(&round_trip(&spline), &spline);

    let rational = BSplineCurve::rational(
        arch(),
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        vec![1.0, 0.5, 0.5, 1.0],
    )
    .unwrap();
    let back = round_trip(&rational);
    assert_same_curve(&back, &rational);
    assert_ne!(back.evaluate(0.5), spline.evaluate(0.5));
}

#[test]
fn test_surfaces_survive_json() {
    let bezier = BezierSurface::new(dome()).unwrap();
    let back = round_trip(&bezier);
    assert_same_surface(&back, &bezier);
    assert_abs_diff_eq!(back.evaluate(0.5, 0.5)[2], 1.0, epsilon = 1e-12);

    let spline = BSplineSurface::clamped(dome(), 2, 1).unwrap();
    let back = round_trip(&spline);
    assert_same_surface(&back, &spline);
    assert_eq!(back.degrees(), (2, 1));
}

#[test]
fn test_circle_evolute_collapses_to_center() {
    let center = DVec2::new(2.0, -1.0);
    let e = evolute(Circle::new(center, 3.0));
    for t in [0.1, 1.0, 2.5, 4.0] {
        let p = e.evaluate(t);
        assert_abs_diff_eq!(p[0], center.x, epsilon = 1e-4);
        assert_abs_diff_eq!(p[1], center.y, epsilon = 1e-4);
    }
}

#[test]
fn test_inversion_in_own_circle_is_identity() {
    let inv = inverse_curve(Circle::new(DVec2::ZERO, 2.0), 0.0, 0.0, 2.0);
    for t in [0.0, 0.7, 3.0] {
        let p = inv.evaluate(t);
        assert_abs_diff_eq!(p[0].hypot(p[1]), 2.0, epsilon = 1e-12);
    }
}

#[test]
fn test_roulettes_flatten_adaptively() {
    let spiro = hypotrochoid(5.0, 3.0, 5.0, 0.0).unwrap();
    let (params, pts) = adaptive_polyline(&spiro, 0.05, 12);
    let (start, end) = spiro.end_points();
    assert_eq!(params.first().copied(), Some(start));
    assert_eq!(params.last().copied(), Some(end));
    assert!(pts.len() > 50);
    // every point lies within the annulus swept by the pole
    for p in &pts {
        let r = p[0].hypot(p[1]);
        assert!(r <= 7.0 + 1e-6 && r >= 3.0 - 1e-6, "r = {r}");
    }

    let cycloid = trochoid(1.0, 1.0, 0.0).unwrap();
    let cusp = cycloid.evaluate(cycloid.end_points().1);
    assert_abs_diff_eq!(cusp[0], std::f64::consts::TAU, epsilon = 1e-6);
    assert_abs_diff_eq!(cusp[1], 0.0, epsilon = 1e-6);
}
