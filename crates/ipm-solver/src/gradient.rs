//! Finite-difference gradient confined to a box.

use nalgebra::DVector;

use crate::search_box::Interval;

/// Gradient of `objective` at `x` by one-sided differences that stay inside
/// `bounds`.
///
/// Each coordinate is probed forward by `step * max(|x_j|, 1)`; when that
/// would leave the box the probe goes backward instead, and when the interval
/// is narrower than the step the probe spans the larger side. Coordinates
/// with a degenerate interval get a zero derivative and are never probed.
///
/// Returns the gradient and the number of objective evaluations spent.
pub fn projected_difference_gradient<F, E>(
    objective: &mut F,
    x: &DVector<f64>,
    fx: f64,
    bounds: &[Interval],
    step: f64,
) -> Result<(DVector<f64>, usize), E>
where
    F: FnMut(&DVector<f64>) -> Result<f64, E>,
{
    let mut grad = DVector::zeros(x.len());
    let mut evaluations = 0;

    for (j, interval) in bounds.iter().enumerate() {
        if interval.is_degenerate() {
            continue;
        }
        let h = step * x[j].abs().max(1.0);
        let room_up = interval.hi() - x[j];
        let room_down = x[j] - interval.lo();

        let delta = if room_up >= h {
            h
        } else if room_down >= h {
            -h
        } else if room_up >= room_down {
            room_up
        } else {
            -room_down
        };

        let mut probe = x.clone();
        probe[j] = interval.clamp(x[j] + delta);
        let actual = probe[j] - x[j];
        if actual == 0.0 {
            continue;
        }
        let f_probe = objective(&probe)?;
        evaluations += 1;
        grad[j] = (f_probe - fx) / actual;
    }

    Ok((grad, evaluations))
}
