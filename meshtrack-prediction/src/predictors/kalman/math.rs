//! Constant-velocity filter algebra over state `[east, north, v_east, v_north]`.

use chrono::{DateTime, Utc};
use meshtrack_core::models::{GeoPoint, KalmanState};
use nalgebra::{Matrix2, Matrix2x4, Matrix4, SymmetricEigen, Vector2, Vector4};

pub type StateVector = Vector4<f64>;
pub type Covariance = Matrix4<f64>;

pub fn transition(dt: f64) -> Matrix4<f64> {
    let mut f = Matrix4::identity();
    f[(0, 2)] = dt;
    f[(1, 3)] = dt;
    f
}

/// Continuous white-noise acceleration with spectral density `accel_std²`,
/// independent per axis.
pub fn process_noise(dt: f64, accel_std: f64) -> Matrix4<f64> {
    let q = accel_std * accel_std;
    let pos = q * dt.powi(3) / 3.0;
    let cross = q * dt * dt / 2.0;
    let vel = q * dt;
    #[rustfmt::skip]
    let noise = Matrix4::new(
        pos,   0.0,   cross, 0.0,
        0.0,   pos,   0.0,   cross,
        cross, 0.0,   vel,   0.0,
        0.0,   cross, 0.0,   vel,
    );
    noise
}

fn observation() -> Matrix2x4<f64> {
    Matrix2x4::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0)
}

pub fn predict(
    x: &StateVector,
    p: &Covariance,
    dt: f64,
    accel_std: f64,
) -> (StateVector, Covariance) {
    let f = transition(dt);
    (f * x, f * p * f.transpose() + process_noise(dt, accel_std))
}

/// Position measurement update in Joseph form. `None` if the innovation
/// covariance cannot be inverted.
pub fn update(
    x: &StateVector,
    p: &Covariance,
    measurement: Vector2<f64>,
    variance: f64,
) -> Option<(StateVector, Covariance)> {
    let h = observation();
    let r = Matrix2::identity() * variance;
    let innovation_cov = h * p * h.transpose() + r;
    let gain = p * h.transpose() * innovation_cov.try_inverse()?;

    let state = x + gain * (measurement - h * x);
    let i_kh = Matrix4::identity() - gain * h;
    let covariance = i_kh * p * i_kh.transpose() + gain * r * gain.transpose();
    Some((state, covariance))
}

#[derive(Debug, Clone, Copy)]
pub struct Repair {
    pub covariance: Covariance,
    pub min_eigenvalue: f64,
    /// The matrix had a materially negative eigenvalue.
    pub corrected: bool,
}

/// Symmetrize and clamp negative eigenvalues to zero.
///
/// Returns `None` for non-finite input. Round-off negatives are clamped
/// silently; only ones beyond a trace-relative tolerance set `corrected`.
pub fn repair_covariance(p: &Covariance) -> Option<Repair> {
    if !p.iter().all(|v| v.is_finite()) {
        return None;
    }
    let symmetric = (p + p.transpose()) * 0.5;
    let eigen = SymmetricEigen::new(symmetric);
    let min_eigenvalue = eigen.eigenvalues.min();
    if min_eigenvalue >= 0.0 {
        return Some(Repair {
            covariance: symmetric,
            min_eigenvalue,
            corrected: false,
        });
    }

    let tolerance = 1e-9 * symmetric.trace().abs().max(1.0);
    let clamped = eigen.eigenvalues.map(|l| l.max(0.0));
    let rebuilt =
        eigen.eigenvectors * Matrix4::from_diagonal(&clamped) * eigen.eigenvectors.transpose();
    Some(Repair {
        covariance: (rebuilt + rebuilt.transpose()) * 0.5,
        min_eigenvalue,
        corrected: min_eigenvalue < -tolerance,
    })
}

pub fn unpack(track: &KalmanState) -> (StateVector, Covariance) {
    (
        Vector4::new(
            track.east_m,
            track.north_m,
            track.velocity_east_mps,
            track.velocity_north_mps,
        ),
        Matrix4::from_row_slice(&track.covariance),
    )
}

pub fn pack(
    origin: GeoPoint,
    x: &StateVector,
    p: &Covariance,
    accel_std: f64,
    last_update: DateTime<Utc>,
) -> KalmanState {
    KalmanState {
        origin,
        east_m: x[0],
        north_m: x[1],
        velocity_east_mps: x[2],
        velocity_north_mps: x[3],
        covariance: std::array::from_fn(|i| p[(i / 4, i % 4)]),
        accel_std_mps2: accel_std,
        last_update,
    }
}

/// Upper-left 2×2 block.
pub fn position_covariance(p: &Covariance) -> Matrix2<f64> {
    p.fixed_view::<2, 2>(0, 0).into_owned()
}

/// Lower-right 2×2 block.
pub fn velocity_covariance(p: &Covariance) -> Matrix2<f64> {
    p.fixed_view::<2, 2>(2, 2).into_owned()
}

/// Std of a 2×2 covariance along unit direction `u`, via its eigenbasis.
pub fn spread_along(covariance: &Matrix2<f64>, u: Vector2<f64>) -> f64 {
    let eigen = SymmetricEigen::new((covariance + covariance.transpose()) * 0.5);
    let variance: f64 = eigen
        .eigenvalues
        .iter()
        .zip(eigen.eigenvectors.column_iter())
        .map(|(lambda, v)| lambda.max(0.0) * v.dot(&u).powi(2))
        .sum();
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_grows_position_uncertainty() {
        let x = Vector4::new(0.0, 0.0, 10.0, 0.0);
        let p = Matrix4::identity();
        let (x1, p1) = predict(&x, &p, 5.0, 0.5);
        assert!((x1[0] - 50.0).abs() < 1e-12);
        assert!(p1[(0, 0)] > p[(0, 0)]);
        assert!((p1 - p1.transpose()).abs().max() < 1e-12);
    }

    #[test]
    fn update_pulls_toward_measurement_and_shrinks_variance() {
        let x = Vector4::zeros();
        let p = Matrix4::identity() * 100.0;
        let (x1, p1) = update(&x, &p, Vector2::new(10.0, 0.0), 100.0).unwrap();
        assert!((x1[0] - 5.0).abs() < 1e-9);
        assert!(p1[(0, 0)] < p[(0, 0)]);
    }

    #[test]
    fn repair_clamps_negative_eigenvalues() {
        let mut p = Matrix4::identity();
        p[(0, 0)] = -4.0;
        p[(0, 1)] = 0.3;
        let repair = repair_covariance(&p).unwrap();
        assert!(repair.corrected);
        assert!(repair.min_eigenvalue < 0.0);
        let eigen = SymmetricEigen::new(repair.covariance);
        assert!(eigen.eigenvalues.min() > -1e-9);
        assert!((repair.covariance - repair.covariance.transpose()).abs().max() < 1e-12);
    }

    #[test]
    fn repair_rejects_nan() {
        let mut p = Matrix4::identity();
        p[(2, 2)] = f64::NAN;
        assert!(repair_covariance(&p).is_none());
    }

    #[test]
    fn spread_along_axis() {
        let cov = Matrix2::new(9.0, 0.0, 0.0, 1.0);
        assert!((spread_along(&cov, Vector2::new(1.0, 0.0)) - 3.0).abs() < 1e-9);
        assert!((spread_along(&cov, Vector2::new(0.0, 1.0)) - 1.0).abs() < 1e-9);
    }
}
