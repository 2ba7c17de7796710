//! Simple integrating attitude estimator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitQuaternion, Vector3};

// Internal
use super::AttitudeEstimator;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of measurements to consume before reporting ready.
const WARMUP_COUNT: u32 = 10;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An attitude estimator which integrates the rotation increments directly.
///
/// This is a stand-in for the full attitude/bias filter executable: it
/// propagates the orientation quaternion from the gyro increments, estimates
/// no bias, and reports ready after a fixed warm-up count. Good enough for
/// bench runs against the simulator, where the increments are noise free.
pub struct DeltaIntegrator {
    quat: UnitQuaternion<f64>,
    num_updates: u32
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DeltaIntegrator {
    /// Create a new integrator starting at the identity orientation.
    pub fn new() -> Self {
        Self {
            quat: UnitQuaternion::identity(),
            num_updates: 0
        }
    }
}

impl Default for DeltaIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl AttitudeEstimator for DeltaIntegrator {
    fn update(
        &mut self,
        _dt_s: f64,
        delta_angles_rad: &Vector3<f64>,
        _delta_velocity_ms: &Vector3<f64>,
        _joint_angles_rad: &Vector3<f64>
    ) {
        // Right-multiply so the increment is applied in the gimbal frame
        self.quat = self.quat * UnitQuaternion::from_scaled_axis(*delta_angles_rad);
        self.num_updates = self.num_updates.saturating_add(1);
    }

    fn orientation(&self) -> UnitQuaternion<f64> {
        self.quat
    }

    fn gyro_bias_rads(&self) -> Vector3<f64> {
        Vector3::zeros()
    }

    fn is_ready(&self) -> bool {
        self.num_updates >= WARMUP_COUNT
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ready_after_warmup() {
        let mut est = DeltaIntegrator::new();
        let zero = Vector3::zeros();

        for i in 0..WARMUP_COUNT {
            assert!(!est.is_ready(), "ready too early at update {}", i);
            est.update(0.01, &zero, &zero, &zero);
        }

        assert!(est.is_ready());
    }

    #[test]
    fn test_integrates_yaw_rotation() {
        let mut est = DeltaIntegrator::new();
        let zero = Vector3::zeros();

        // 100 increments of 0.01 rad about z
        for _ in 0..100 {
            est.update(0.01, &Vector3::new(0.0, 0.0, 0.01), &zero, &zero);
        }

        let (_, _, yaw) = est.orientation().euler_angles();
        assert!((yaw - 1.0).abs() < 1e-9);
    }
}
