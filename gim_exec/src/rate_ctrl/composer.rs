//! Rate demand composition for RateCtrl
//!
//! The rate demand sent to the gimbal is the sum of three independently
//! derived terms plus the estimated gyro bias. Each term is computed fully
//! every cycle, the only state carried across cycles is the vehicle yaw rate
//! filter and the previous forward demand quaternion.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitQuaternion, Vector3};

// Internal
use super::frames::{mat_from_euler312, quat_to_rotation_vector};
use super::{RateCtrl, VehicleData};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RateCtrl {

    /// Compose the rate demand vector for the current measurement.
    ///
    /// Runs the attitude estimator over the measurement, then sums the yaw
    /// centring, tilt tracking and forward feed-forward terms, and finally
    /// compensates for the estimated gyro bias.
    ///
    /// Note: the bias is added, not subtracted, matching the sign convention
    /// expected by the gimbal's rate servos.
    pub(crate) fn update_rate_demand(&mut self, vehicle: &VehicleData) -> Vector3<f64> {
        // Run the gimbal attitude and gyro bias estimator
        self.estimator.update(
            self.params.delta_time_s,
            &self.measurement.delta_angles_rad,
            &self.measurement.delta_velocity_ms,
            &self.measurement.joint_angles_rad
        );

        // Get the gimbal quaternion estimate
        let quat_est = self.estimator.orientation();

        // Add the control rate vectors
        let mut rate_dem_rads = self.rate_dem_yaw(vehicle)
            + self.rate_dem_tilt(&quat_est)
            + self.rate_dem_forward();

        // Compensate for gyro bias
        rate_dem_rads += self.estimator.gyro_bias_rads();

        rate_dem_rads
    }

    /// Calculate the rate demand required to keep the yaw joint centred.
    ///
    /// The yaw joint angle is pulled back to zero by a proportional term. If
    /// the vehicle is turning faster than the proportional term can null out
    /// within the permitted yaw error, the excess turn rate is added as a
    /// correction so the joint does not saturate against its mechanical
    /// limit.
    pub(crate) fn rate_dem_yaw(&mut self, vehicle: &VehicleData) -> Vector3<f64> {
        // Rotation from vehicle to gimbal using a 312 rotation sequence
        let t_vg = mat_from_euler312(self.measurement.joint_angles_rad);

        // Multiply the yaw joint angle by a gain to calculate a demanded
        // vehicle frame relative rate vector required to keep the yaw joint
        // centred
        let mut rate_dem_yaw = Vector3::new(
            0.0,
            0.0,
            -self.params.k_gimbal_rate * self.measurement.joint_angles_rad.z
        );

        // Filter the vehicle turn rate in earth frame
        let alpha = self.params.yaw_rate_filt_pole * self.params.delta_time_s;
        self.vehicle_yaw_rate_filt_rads = (1.0 - alpha) * self.vehicle_yaw_rate_filt_rads
            + alpha * vehicle.yaw_rate_earth_rads;
        let vehicle_rate_ef = Vector3::new(0.0, 0.0, self.vehicle_yaw_rate_filt_rads);

        // Maximum steady state rate error corresponding to the maximum
        // permitted yaw angle error
        let max_rate_rads = self.params.k_gimbal_rate * self.params.yaw_error_limit_rad;
        let vehicle_rate_mag_ef = vehicle_rate_ef.norm();
        let excess_rate_correction = vehicle_rate_mag_ef - max_rate_rads;

        if vehicle_rate_mag_ef > max_rate_rads {
            let correction_vf = vehicle.attitude_matrix.transpose()
                * Vector3::new(0.0, 0.0, excess_rate_correction);

            if vehicle_rate_ef.z > 0.0 {
                rate_dem_yaw += correction_vf;
            }
            else {
                rate_dem_yaw -= correction_vf;
            }
        }

        // Rotate into gimbal frame to get the gimbal rate vector required to
        // keep the yaw gimbal centred
        t_vg * rate_dem_yaw
    }

    /// Calculate the rate demand required to track the tilt angle target.
    ///
    /// The demanded quaternion carries zero roll, the current tilt target,
    /// and the estimated yaw, so only roll and tilt produce a non-zero error:
    /// yaw is slaved to the vehicle rather than commanded.
    pub(crate) fn rate_dem_tilt(&self, quat_est: &UnitQuaternion<f64>) -> Vector3<f64> {
        // Gimbal 321 Euler angle estimates relative to earth frame
        let (_, _, yaw_est_rad) = quat_est.euler_angles();

        // Demanded quaternion using the demanded tilt and estimated yaw
        let quat_dem = UnitQuaternion::from_euler_angles(
            0.0,
            self.angle_target_rad.tilt_rad,
            yaw_est_rad
        );

        // Divide the demanded quaternion by the estimated to get the error
        let quat_err = quat_dem * quat_est.inverse();

        // Multiply the angle error vector by a gain to get a demanded gimbal
        // rate required to control tilt
        quat_to_rotation_vector(quat_err) * self.params.k_gimbal_rate
    }

    /// Calculate the forward path rate demand from the change in the
    /// demanded orientation.
    ///
    /// The forward demand excludes yaw (yaw tracking is handled by the yaw
    /// centring term), so a constant tilt target produces a zero forward
    /// term.
    pub(crate) fn rate_dem_forward(&mut self) -> Vector3<f64> {
        // Delta rotation from the last to the current demand, where the
        // demand does not incorporate the vehicle's yaw rotation
        let quat_dem_forward = UnitQuaternion::from_euler_angles(
            0.0,
            self.angle_target_rad.tilt_rad,
            0.0
        );
        let delta_quat = quat_dem_forward * self.last_quat_dem.inverse();
        self.last_quat_dem = quat_dem_forward;

        // Convert to a rotation vector and divide by delta time to obtain a
        // forward path rate demand
        quat_to_rotation_vector(delta_quat) * (1.0 / self.params.delta_time_s)
    }
}

#[cfg(test)]
mod test {
    use super::super::state::testing::{scripted_rate_ctrl, test_params};
    use nalgebra::{UnitQuaternion, Vector3};

    use crate::rate_ctrl::VehicleData;

    #[test]
    fn test_yaw_term_proportional_below_excess_threshold() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        // Non-zero joints so the 312 rotation is exercised, vehicle at rest
        rc.measurement.joint_angles_rad = Vector3::new(0.05, -0.1, 0.3);
        let vehicle = VehicleData::default();

        let yaw_dem = rc.rate_dem_yaw(&vehicle);

        // With no excess rate correction the magnitude is exactly
        // K * |joint_yaw|, the 312 rotation is orthonormal
        let expected = test_params().k_gimbal_rate * 0.3;
        assert!((yaw_dem.norm() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_yaw_term_excess_rate_correction() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        // pole * dt = 1 for the test params, so the filter passes the raw
        // rate straight through on the first cycle
        let vehicle = VehicleData {
            yaw_rate_earth_rads: 0.2,
            ..Default::default()
        };

        let yaw_dem = rc.rate_dem_yaw(&vehicle);

        // maxRate = 0.1 * 0.5 = 0.05, excess = 0.15, level vehicle and zero
        // joints so the correction lands on z unrotated
        assert!(yaw_dem.x.abs() < 1e-12);
        assert!(yaw_dem.y.abs() < 1e-12);
        assert!((yaw_dem.z - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_yaw_term_excess_rate_correction_negative_turn() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        let vehicle = VehicleData {
            yaw_rate_earth_rads: -0.2,
            ..Default::default()
        };

        let yaw_dem = rc.rate_dem_yaw(&vehicle);

        // Correction is signed to match the direction of the turn
        assert!((yaw_dem.z + 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_forward_term_zero_for_held_target() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        rc.angle_target_rad.tilt_rad = 0.3;

        // First cycle sees the step from the initial demand
        let first = rc.rate_dem_forward();
        assert!(first.norm() > 0.0);

        // Second cycle with the target held sees no delta
        let second = rc.rate_dem_forward();
        assert_eq!(second, Vector3::zeros());
    }

    #[test]
    fn test_tilt_term_zero_at_demand() {
        let rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        // Estimate matches the (zero) demand exactly, error is the identity
        // rotation and the singularity branch returns zero
        let tilt_dem = rc.rate_dem_tilt(&UnitQuaternion::identity());
        assert_eq!(tilt_dem, Vector3::zeros());
    }
}
