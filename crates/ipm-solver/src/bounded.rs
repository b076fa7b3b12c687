//! Bounded local search.
//!
//! Projected gradient descent with a Barzilai-Borwein step and Armijo
//! backtracking along the projection arc. Every evaluated point, gradient
//! probes included, lies inside the box.

use nalgebra::DVector;
use tracing::debug;

use crate::error::SolverError;
use crate::gradient::projected_difference_gradient;
use crate::search_box::Interval;

/// Bounded search configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoundedSearchConfig {
    /// Stop when two consecutive iterations each reduce the objective by
    /// less than this fraction of `max(|f_k|, |f_k+1|, 1)`
    pub f_tol: f64,
    /// Stop when the largest projected-gradient component falls below this
    pub g_tol: f64,
    /// Relative finite-difference step
    pub step: f64,
    /// Maximum iterations
    pub max_iterations: usize,
    /// Maximum objective evaluations, gradient probes included
    pub max_evaluations: usize,
    /// Sufficient-decrease constant
    pub armijo: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl BoundedSearchConfig {
    /// Loose settings for engineering fits against a slow engine.
    pub fn coarse() -> Self {
        Self {
            f_tol: 0.05,
            g_tol: 0.05,
            step: 1e-3,
            max_iterations: 200,
            max_evaluations: 1000,
            armijo: 1e-4,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }

    fn validate(&self) -> Result<(), SolverError> {
        let bad = |what: &str| {
            Err(SolverError::ProblemSetup {
                what: what.to_string(),
            })
        };
        if !(self.step > 0.0) {
            return bad("finite-difference step must be positive");
        }
        if !(self.line_search_beta > 0.0 && self.line_search_beta < 1.0) {
            return bad("line search factor must lie in (0, 1)");
        }
        if !(self.f_tol >= 0.0 && self.g_tol >= 0.0) {
            return bad("tolerances must be non-negative");
        }
        if self.max_evaluations == 0 {
            return bad("evaluation budget must be positive");
        }
        Ok(())
    }
}

impl Default for BoundedSearchConfig {
    fn default() -> Self {
        Self::coarse()
    }
}

/// Why the search stopped. None of these is a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Termination {
    Stationary,
    FunctionTolerance,
    LineSearchStalled,
    MaxIterations,
    MaxEvaluations,
    DegenerateBox,
}

impl Termination {
    pub fn is_converged(self) -> bool {
        matches!(self, Self::Stationary | Self::FunctionTolerance)
    }
}

/// Bounded search result.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundedResult {
    /// Best point found
    pub x: DVector<f64>,
    /// Objective value at `x`
    pub value: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Number of objective evaluations
    pub evaluations: usize,
    pub termination: Termination,
}

fn project(x: &DVector<f64>, bounds: &[Interval]) -> DVector<f64> {
    DVector::from_iterator(
        x.len(),
        x.iter().zip(bounds).map(|(v, interval)| interval.clamp(*v)),
    )
}

fn checked<E: From<SolverError>>(value: f64) -> Result<f64, E> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolverError::Numeric {
            what: format!("objective returned {value}"),
        }
        .into())
    }
}

/// Minimizes `objective` over the box `bounds`, starting from `x0` clamped
/// into the box.
///
/// Errors from the objective are propagated unchanged; non-convergence is
/// reported through `Termination`, not as an error.
pub fn minimize_bounded<F, E>(
    mut objective: F,
    x0: &DVector<f64>,
    bounds: &[Interval],
    config: &BoundedSearchConfig,
) -> Result<BoundedResult, E>
where
    F: FnMut(&DVector<f64>) -> Result<f64, E>,
    E: From<SolverError>,
{
    config.validate()?;
    if x0.len() != bounds.len() {
        return Err(SolverError::ProblemSetup {
            what: format!("{} start values for {} bounds", x0.len(), bounds.len()),
        }
        .into());
    }

    let mut x = project(x0, bounds);
    let mut fx = checked::<E>(objective(&x)?)?;
    let mut evaluations = 1;

    if bounds.iter().all(Interval::is_degenerate) {
        return Ok(BoundedResult {
            x,
            value: fx,
            iterations: 0,
            evaluations,
            termination: Termination::DegenerateBox,
        });
    }

    let max_width = bounds.iter().map(Interval::width).fold(0.0, f64::max);
    let mut previous: Option<(DVector<f64>, DVector<f64>)> = None;
    let mut small_reductions = 0;

    for iter in 0..config.max_iterations {
        if evaluations + bounds.len() > config.max_evaluations {
            return Ok(stop(&x, fx, iter, evaluations, Termination::MaxEvaluations));
        }
        let (g, spent) =
            projected_difference_gradient(&mut objective, &x, fx, bounds, config.step)?;
        evaluations += spent;
        if g.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::Numeric {
                what: "non-finite gradient".to_string(),
            }
            .into());
        }

        let pg = &x - project(&(&x - &g), bounds);
        let pg_norm = pg.amax();
        if pg_norm <= config.g_tol {
            return Ok(stop(&x, fx, iter, evaluations, Termination::Stationary));
        }

        // The largest free gradient component moves at most the widest side.
        let free = g.zip_map(&pg, |gj, pj| if pj == 0.0 { 0.0 } else { gj });
        let cap = max_width / free.amax();
        let mut alpha = match &previous {
            Some((x_prev, g_prev)) => {
                let s = &x - x_prev;
                let y = &g - g_prev;
                let sy = s.dot(&y);
                if sy > 0.0 { (s.dot(&s) / sy).min(cap) } else { cap }
            }
            None => cap,
        };

        let mut accepted = None;
        let mut last_trial: Option<DVector<f64>> = None;
        for _ in 0..config.max_line_search_iters {
            let candidate = project(&(&x - alpha * &g), bounds);
            let d = &candidate - &x;
            if d.amax() == 0.0 {
                break;
            }
            // Clamped candidates repeat until alpha drops below the breakpoint.
            if last_trial.as_ref() == Some(&candidate) {
                alpha *= config.line_search_beta;
                continue;
            }
            if evaluations >= config.max_evaluations {
                return Ok(stop(&x, fx, iter, evaluations, Termination::MaxEvaluations));
            }
            let f_candidate = checked::<E>(objective(&candidate)?)?;
            evaluations += 1;
            if f_candidate <= fx + config.armijo * g.dot(&d) {
                accepted = Some((candidate, f_candidate));
                break;
            }
            last_trial = Some(candidate);
            alpha *= config.line_search_beta;
        }

        let Some((x_new, f_new)) = accepted else {
            return Ok(stop(&x, fx, iter, evaluations, Termination::LineSearchStalled));
        };

        debug!(iter, f = f_new, alpha, "bounded search step");
        let reduction = (fx - f_new) / fx.abs().max(f_new.abs()).max(1.0);
        previous = Some((x.clone(), g));
        x = x_new;
        fx = f_new;

        if reduction <= config.f_tol {
            small_reductions += 1;
            if small_reductions >= 2 {
                return Ok(stop(&x, fx, iter + 1, evaluations, Termination::FunctionTolerance));
            }
        } else {
            small_reductions = 0;
        }
    }

    Ok(stop(&x, fx, config.max_iterations, evaluations, Termination::MaxIterations))
}

fn stop(
    x: &DVector<f64>,
    value: f64,
    iterations: usize,
    evaluations: usize,
    termination: Termination,
) -> BoundedResult {
    BoundedResult {
        x: x.clone(),
        value,
        iterations,
        evaluations,
        termination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverResult;

    fn bounds(pairs: &[(f64, f64)]) -> Vec<Interval> {
        pairs
            .iter()
            .map(|&(lo, hi)| Interval::new(lo, hi).unwrap())
            .collect()
    }

    fn tight() -> BoundedSearchConfig {
        BoundedSearchConfig {
            f_tol: 0.0,
            g_tol: 1e-6,
            step: 1e-7,
            ..BoundedSearchConfig::coarse()
        }
    }

    #[test]
    fn interior_minimum() {
        let b = bounds(&[(0.0, 4.0), (0.0, 4.0)]);
        let f = |x: &DVector<f64>| -> SolverResult<f64> {
            Ok((x[0] - 1.5).powi(2) + 2.0 * (x[1] - 2.5).powi(2))
        };
        let r = minimize_bounded(f, &DVector::from_vec(vec![3.0, 0.5]), &b, &tight()).unwrap();
        assert!((r.x[0] - 1.5).abs() < 1e-3, "{:?}", r);
        assert!((r.x[1] - 2.5).abs() < 1e-3, "{:?}", r);
        assert_ne!(r.termination, Termination::MaxIterations);
    }

    #[test]
    fn minimum_outside_box_lands_on_bound() {
        let b = bounds(&[(0.9, 1.1), (0.8, 1.2)]);
        let f = |x: &DVector<f64>| -> SolverResult<f64> {
            Ok((x[0] - 2.0).powi(2) + (x[1] - 0.0).powi(2))
        };
        let r = minimize_bounded(f, &DVector::from_vec(vec![1.0, 1.0]), &b, &tight()).unwrap();
        assert!((r.x[0] - 1.1).abs() < 1e-9);
        assert!((r.x[1] - 0.8).abs() < 1e-9);
    }

    #[test]
    fn start_outside_box_is_clamped() {
        let b = bounds(&[(1.1, 1.1), (1.2, 3.0)]);
        let mut first = None;
        let f = |x: &DVector<f64>| -> SolverResult<f64> {
            first.get_or_insert(x[0]);
            Ok((x[1] - 2.0).powi(2))
        };
        let r = minimize_bounded(f, &DVector::from_vec(vec![1.09, 1.2]), &b, &tight()).unwrap();
        assert_eq!(first, Some(1.1));
        assert_eq!(r.x[0], 1.1);
        assert!((r.x[1] - 2.0).abs() < 1e-3);
    }

    #[test]
    fn steep_gradient_reaches_interior_minimum() {
        let b = bounds(&[(1.2, 3.0)]);
        let mut trials = Vec::new();
        let f = |x: &DVector<f64>| -> SolverResult<f64> {
            trials.push(x[0]);
            Ok((160.0 - 90.0 * x[0]).powi(2))
        };
        let r = minimize_bounded(
            f,
            &DVector::from_vec(vec![1.2]),
            &b,
            &BoundedSearchConfig::coarse(),
        )
        .unwrap();
        assert!((r.x[0] - 160.0 / 90.0).abs() < 0.01, "{r:?}");
        assert!(trials.iter().filter(|&&v| v == 3.0).count() <= 1, "{trials:?}");
    }

    #[test]
    fn function_tolerance_needs_two_small_steps() {
        let b = bounds(&[(0.0, 4.0), (0.0, 4.0)]);
        let config = BoundedSearchConfig {
            f_tol: 1.0,
            ..tight()
        };
        let f = |x: &DVector<f64>| -> SolverResult<f64> {
            Ok((x[0] - 1.5).powi(2) + 2.0 * (x[1] - 2.5).powi(2))
        };
        let r = minimize_bounded(f, &DVector::from_vec(vec![3.0, 0.5]), &b, &config).unwrap();
        assert_eq!(r.termination, Termination::FunctionTolerance);
        assert_eq!(r.iterations, 2);
    }

    #[test]
    fn fully_degenerate_box_evaluates_once() {
        let b = bounds(&[(1.0, 1.0), (2.0, 2.0)]);
        let mut calls = 0;
        let f = |_: &DVector<f64>| -> SolverResult<f64> {
            calls += 1;
            Ok(7.0)
        };
        let r = minimize_bounded(f, &DVector::from_vec(vec![0.0, 0.0]), &b, &tight()).unwrap();
        assert_eq!(r.termination, Termination::DegenerateBox);
        assert_eq!(r.evaluations, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn evaluation_budget_is_respected() {
        let b = bounds(&[(-100.0, 100.0), (-100.0, 100.0)]);
        let config = BoundedSearchConfig {
            max_evaluations: 10,
            ..tight()
        };
        let mut calls = 0;
        let f = |x: &DVector<f64>| -> SolverResult<f64> {
            calls += 1;
            Ok((x[0] - 3.0).powi(4) + (x[1] + 7.0).powi(2) * 10.0)
        };
        let r = minimize_bounded(f, &DVector::from_vec(vec![90.0, 90.0]), &b, &config).unwrap();
        assert!(r.evaluations <= 10);
        assert_eq!(r.evaluations, calls);
    }

    #[test]
    fn objective_error_propagates() {
        let b = bounds(&[(0.0, 1.0)]);
        let f = |_: &DVector<f64>| -> SolverResult<f64> {
            Err(SolverError::Numeric {
                what: "boom".into(),
            })
        };
        let err = minimize_bounded(f, &DVector::from_vec(vec![0.5]), &b, &tight()).unwrap_err();
        assert!(matches!(err, SolverError::Numeric { .. }));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let b = bounds(&[(0.0, 1.0)]);
        let f = |_: &DVector<f64>| -> SolverResult<f64> { Ok(0.0) };
        let err = minimize_bounded(f, &DVector::from_vec(vec![0.5, 0.5]), &b, &tight()).unwrap_err();
        assert!(matches!(err, SolverError::ProblemSetup { .. }));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_evaluation_stays_in_box(
                lo0 in -2.0f64..2.0, w0 in 0.0f64..3.0,
                lo1 in -2.0f64..2.0, w1 in 0.0f64..3.0,
                c0 in -5.0f64..5.0, c1 in -5.0f64..5.0,
                s0 in -5.0f64..5.0, s1 in -5.0f64..5.0,
            ) {
                let b = bounds(&[(lo0, lo0 + w0), (lo1, lo1 + w1)]);
                let mut outside = 0usize;
                let f = |x: &DVector<f64>| -> SolverResult<f64> {
                    if !(b[0].contains(x[0]) && b[1].contains(x[1])) {
                        outside += 1;
                    }
                    Ok((x[0] - c0).powi(2) + 3.0 * (x[1] - c1).powi(2))
                };
                let r = minimize_bounded(
                    f,
                    &DVector::from_vec(vec![s0, s1]),
                    &b,
                    &BoundedSearchConfig::coarse(),
                ).unwrap();
                prop_assert_eq!(outside, 0);
                prop_assert!(b[0].contains(r.x[0]) && b[1].contains(r.x[1]));
            }

            #[test]
            fn result_is_no_worse_than_start(
                c0 in 0.0f64..4.0, c1 in 0.0f64..4.0,
                s0 in 0.0f64..4.0, s1 in 0.0f64..4.0,
            ) {
                let b = bounds(&[(0.5, 3.0), (0.5, 3.0)]);
                let obj = move |x: &DVector<f64>| (x[0] - c0).powi(2) + (x[1] - c1).powi(2);
                let start = DVector::from_vec(vec![s0, s1]);
                let f0 = obj(&project(&start, &b));
                let r = minimize_bounded(
                    |x: &DVector<f64>| -> SolverResult<f64> { Ok(obj(x)) },
                    &start,
                    &b,
                    &BoundedSearchConfig::coarse(),
                ).unwrap();
                prop_assert!(r.value <= f0 + 1e-12);
            }
        }
    }
}
