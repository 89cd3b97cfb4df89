//! Univariate minimization by Brent's method.
//!
//! Golden-section search with parabolic interpolation steps where the
//! recent history supports one. The single backend used for
//! one-dimensional objectives and for Powell's line searches.

use crate::error::Result;
use crate::optimization::solvers::Solution;

/// 2 - phi, the golden-section interior fraction.
const GOLDEN: f64 = 0.381_966_011_250_105;

/// Minimize `f` on the bracket `[lower, upper]`, probing `start` first
/// (clamped into the bracket interior; a start on or outside the
/// bracket falls back to the golden interior point).
///
/// Stops when the candidate interval shrinks below `tolerance` (relative,
/// with a small absolute floor) or after `max_iterations` refinements.
pub fn minimize<F>(
    mut f: F,
    lower: f64,
    upper: f64,
    start: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<Solution>
where
    F: FnMut(f64) -> Result<f64>,
{
    let (mut a, mut b) = if lower <= upper {
        (lower, upper)
    } else {
        (upper, lower)
    };

    let mut x = start.max(a).min(b);
    if x <= a || x >= b {
        x = a + GOLDEN * (b - a);
    }
    let mut w = x;
    let mut v = x;
    let mut fx = f(x)?;
    let mut evaluations = 1;
    let mut fw = fx;
    let mut fv = fx;

    // d is the last step, e the one before it.
    let mut d = 0.0_f64;
    let mut e = 0.0_f64;

    for _ in 0..max_iterations {
        let midpoint = 0.5 * (a + b);
        let tol = tolerance * x.abs() + 1.0e-12;
        if (x - midpoint).abs() <= 2.0 * tol - 0.5 * (b - a) {
            break;
        }

        let mut golden_step = true;
        if e.abs() > tol {
            // Parabola through (v, fv), (w, fw), (x, fx).
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let previous = e;
            e = d;
            // Accept only if the step is shrinking and stays inside.
            if p.abs() < (0.5 * q * previous).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                let u = x + d;
                if u - a < 2.0 * tol || b - u < 2.0 * tol {
                    d = if midpoint > x { tol } else { -tol };
                }
                golden_step = false;
            }
        }
        if golden_step {
            e = if x < midpoint { b - x } else { a - x };
            d = GOLDEN * e;
        }

        let u = if d.abs() >= tol {
            x + d
        } else if d > 0.0 {
            x + tol
        } else {
            x - tol
        };
        let fu = f(u)?;
        evaluations += 1;

        if fu <= fx {
            if u < x {
                b = x;
            } else {
                a = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    Ok(Solution {
        point: vec![x],
        value: fx,
        evaluations,
    })
}
