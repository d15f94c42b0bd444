//! W-3/4 nonlinear weighting limiter.
//!
//! For one equation with `n` sub-element gradients `g_k`:
//!
//! 1. smoothness weights `w_k = 1 / |g_k|^alpha` (norm floored by ε)
//! 2. deviations `δ_k = w_k / Σw - 1/n`
//! 3. bound `L = min((1 - 1/n) / (δ_max + ε), -(1/n) / (δ_min - ε))`,
//!    clamped to the CFL ceiling `sigma0 / |CFL|`
//! 4. final weights `1/n + L δ_k`, which sum to one and stay in `[0, 1]`
//!
//! Weights are rescaled by the smallest norm so the largest weight is 1.
//! Only `w / Σw` is consumed, so the scale cancels, and a large `alpha`
//! no longer overflows to `inf / inf`.

use crate::params::ALMOST_ZERO;

/// Smoothness weights of one equation; returns their sum.
///
/// `norms` must already be floored (see
/// [`floored_norm`](super::gradient::floored_norm)).
pub fn smoothness_weights(norms: &[f64], alpha: f64, weights: &mut [f64]) -> f64 {
    let smallest = norms.iter().copied().fold(f64::INFINITY, f64::min);
    let mut sum = 0.0;
    for (w, &n) in weights.iter_mut().zip(norms) {
        *w = (smallest / n).powf(alpha);
        sum += *w;
    }
    sum
}

/// Overwrite `weights` with the deviations `w / sum - base`.
///
/// Returns `(δ_max, δ_min)`, each seeded at zero.
pub fn deviations(weights: &mut [f64], sum: f64, base: f64) -> (f64, f64) {
    let mut dmax = 0.0_f64;
    let mut dmin = 0.0_f64;
    for w in weights.iter_mut() {
        let d = *w / sum - base;
        *w = d;
        dmax = dmax.max(d);
        dmin = dmin.min(d);
    }
    (dmax, dmin)
}

/// Limiter bound before the CFL clamp.
#[inline]
pub fn raw_bound(base: f64, dmax: f64, dmin: f64) -> f64 {
    ((1.0 - base) / (dmax + ALMOST_ZERO)).min(-base / (dmin - ALMOST_ZERO))
}

/// Final weight of one sub-element.
#[inline(always)]
pub fn final_weight(base: f64, bound: f64, deviation: f64) -> f64 {
    base + bound * deviation
}

/// Run steps 1-3 for one equation and turn `weights` into final weights.
///
/// Returns the clamped bound.
pub fn limit_equation(norms: &[f64], alpha: f64, ceiling: f64, weights: &mut [f64]) -> f64 {
    let base = 1.0 / norms.len() as f64;
    let sum = smoothness_weights(norms, alpha, weights);
    let (dmax, dmin) = deviations(weights, sum, base);
    let bound = raw_bound(base, dmax, dmin).min(ceiling);
    for w in weights.iter_mut() {
        *w = final_weight(base, bound, *w);
    }
    bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equal_norms_give_equal_weights() {
        let norms = [0.5; 4];
        let mut w = [0.0; 4];
        let bound = limit_equation(&norms, 2.0, 6.0, &mut w);
        for &wk in &w {
            assert_relative_eq!(wk, 0.25);
        }
        // Zero deviation: the ceiling takes over
        assert_eq!(bound, 6.0);
    }

    #[test]
    fn test_weights_sum_to_one_and_stay_in_unit_interval() {
        let norms = [1e-3, 0.2, 1.0, 5.0, 0.04, 2.5];
        for alpha in [0.0, 1.0, 2.0, 4.0, 8.0] {
            for ceiling in [0.5, 1.0, 10.0, f64::INFINITY] {
                let mut w = [0.0; 6];
                limit_equation(&norms, alpha, ceiling, &mut w);
                let sum: f64 = w.iter().sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
                for &wk in &w {
                    assert!((-1e-12..=1.0 + 1e-12).contains(&wk), "weight {}", wk);
                }
            }
        }
    }

    #[test]
    fn test_bound_respects_ceiling() {
        let norms = [0.1, 0.3, 0.9];
        for ceiling in [0.1, 0.7, 1.3] {
            let mut w = [0.0; 3];
            let bound = limit_equation(&norms, 1.0, ceiling, &mut w);
            assert!(bound <= ceiling);
        }
    }

    #[test]
    fn test_large_alpha_does_not_overflow() {
        // One flat sub-element (norm at the ε floor) next to steep ones
        let norms = [1e-100, 1.0, 2.0];
        let mut w = [0.0; 3];
        limit_equation(&norms, 8.0, f64::INFINITY, &mut w);
        assert!(w.iter().all(|v| v.is_finite()));
        // The flat sub-element takes all the weight
        assert_relative_eq!(w[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_smoother_sub_element_gets_more_weight() {
        let norms = [0.1, 1.0];
        let mut w = [0.0; 2];
        limit_equation(&norms, 1.0, f64::INFINITY, &mut w);
        assert!(w[0] > w[1]);
    }

    #[test]
    fn test_raw_bound_zero_deviation_is_huge() {
        assert!(raw_bound(0.25, 0.0, 0.0) > 1e100);
    }
}
