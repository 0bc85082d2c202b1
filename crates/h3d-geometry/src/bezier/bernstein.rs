//! Bernstein polynomials and binomial coefficients.

/// Highest degree served from the precomputed table.
pub const TABLE_DEGREE: usize = 20;

const fn pascal_triangle() -> [[u64; TABLE_DEGREE + 1]; TABLE_DEGREE + 1] {
    let mut table = [[0u64; TABLE_DEGREE + 1]; TABLE_DEGREE + 1];
    let mut n = 0;
    while n <= TABLE_DEGREE {
        table[n][0] = 1;
        let mut k = 1;
        while k <= n {
            let above = if k < n { table[n - 1][k] } else { 0 };
            table[n][k] = table[n - 1][k - 1] + above;
            k += 1;
        }
        n += 1;
    }
    table
}

static BINOMIALS: [[u64; TABLE_DEGREE + 1]; TABLE_DEGREE + 1] = pascal_triangle();

fn factorial(n: usize) -> f64 {
    (2..=n).fold(1.0, |acc, i| acc * i as f64)
}

/// Binomial coefficient `C(n, k)`.
///
/// Exact up to degree 20. Above that it is computed from factorials, which
/// loses precision as `n` grows and overflows past `n = 170`.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    if n <= TABLE_DEGREE {
        return BINOMIALS[n][k] as f64;
    }
    factorial(n) / (factorial(k) * factorial(n - k))
}

/// The Bernstein basis polynomial `B_{i,n}(t) = C(n,i) t^i (1-t)^(n-i)`.
pub fn bernstein(n: usize, i: usize, t: f64) -> f64 {
    if i > n {
        return 0.0;
    }
    binomial(n, i) * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32)
}

/// All `n + 1` basis values of degree `n` at `t`.
pub fn bernstein_basis(n: usize, t: f64) -> Vec<f64> {
    (0..=n).map(|i| bernstein(n, i, t)).collect()
}
