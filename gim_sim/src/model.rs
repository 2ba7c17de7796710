//! Simulation models for the gimbal and the vehicle
//!
//! The models are deliberately simple: actuation is perfect, sensing is
//! noise free, and the vehicle turns at a constant commanded yaw rate. The
//! point of the simulator is to close the control loop over the network, not
//! to reproduce gimbal dynamics.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use comms_if::eqpt::gimbal::{GimbalControl, GimbalFeedback};
use comms_if::eqpt::vehicle::VehicleState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated gimbal equipment.
pub struct GimbalModel {
    /// Joint angles (roll, elevation, azimuth).
    ///
    /// Units: radians
    joint_angles_rad: Vector3<f64>,

    /// Rate demand currently being actuated, in the gimbal frame.
    ///
    /// Units: radians/second
    rate_dem_rads: Vector3<f64>,

    /// Sequence id of the next feedback message.
    next_id: u8,
}

/// Simulated vehicle, turning at a constant yaw rate on level ground.
pub struct VehicleModel {
    /// Heading of the vehicle in the earth frame.
    ///
    /// Units: radians
    yaw_rad: f64,

    /// Constant turn rate.
    ///
    /// Units: radians/second
    yaw_rate_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GimbalModel {
    pub fn new(initial_joint_angles_rad: [f64; 3]) -> Self {
        Self {
            joint_angles_rad: Vector3::from(initial_joint_angles_rad),
            rate_dem_rads: Vector3::zeros(),
            next_id: 1,
        }
    }

    /// Apply a rate control message to the model.
    ///
    /// The demand is held until the next control message arrives.
    pub fn set_rate_demand(&mut self, control: &GimbalControl) {
        self.rate_dem_rads = Vector3::new(
            control.rate_x as f64,
            control.rate_y as f64,
            control.rate_z as f64,
        );
    }

    /// Advance the model by one period and produce the feedback message.
    ///
    /// The platform actuates the demanded rates exactly. The azimuth joint
    /// additionally unwinds at the vehicle's turn rate, since the joint angle
    /// is measured between the platform and the turning vehicle.
    pub fn step(&mut self, dt_s: f64, vehicle_yaw_rate_rads: f64) -> GimbalFeedback {
        let delta_angles_rad = self.rate_dem_rads * dt_s;

        self.joint_angles_rad.x += delta_angles_rad.x;
        self.joint_angles_rad.y += delta_angles_rad.y;
        self.joint_angles_rad.z += delta_angles_rad.z - vehicle_yaw_rate_rads * dt_s;

        let feedback = GimbalFeedback {
            id: self.next_id,
            gyro_x: delta_angles_rad.x as f32,
            gyro_y: delta_angles_rad.y as f32,
            gyro_z: delta_angles_rad.z as f32,
            acc_x: 0.0,
            acc_y: 0.0,
            acc_z: (-9.81 * dt_s) as f32,
            joint_roll: self.joint_angles_rad.x as f32,
            joint_el: self.joint_angles_rad.y as f32,
            joint_az: self.joint_angles_rad.z as f32,
        };

        self.next_id = self.next_id.wrapping_add(1);

        feedback
    }
}

impl VehicleModel {
    pub fn new(yaw_rate_rads: f64) -> Self {
        Self {
            yaw_rad: 0.0,
            yaw_rate_rads,
        }
    }

    /// Advance the vehicle by one period and produce the state message.
    pub fn step(&mut self, dt_s: f64) -> VehicleState {
        self.yaw_rad += self.yaw_rate_rads * dt_s;

        let half = 0.5 * self.yaw_rad;

        VehicleState {
            yaw_rate_earth_rads: self.yaw_rate_rads,
            quat_wxyz: [half.cos(), 0.0, 0.0, half.sin()],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_feedback_ids_increment_and_wrap() {
        let mut gimbal = GimbalModel::new([0.0; 3]);
        gimbal.next_id = 254;

        assert_eq!(gimbal.step(0.02, 0.0).id, 254);
        assert_eq!(gimbal.step(0.02, 0.0).id, 255);
        assert_eq!(gimbal.step(0.02, 0.0).id, 0);
    }

    #[test]
    fn test_azimuth_joint_unwinds_with_turn() {
        let mut gimbal = GimbalModel::new([0.0; 3]);

        // Vehicle turns at 0.1 rad/s for 10 steps of 0.1 s with no demand,
        // the azimuth joint winds back a full -0.1 rad
        for _ in 0..10 {
            gimbal.step(0.1, 0.1);
        }

        assert!((gimbal.joint_angles_rad.z + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_demand_actuated_exactly() {
        let mut gimbal = GimbalModel::new([0.0; 3]);

        gimbal.set_rate_demand(&GimbalControl {
            target_system: 1,
            target_component: 154,
            id: 1,
            rate_x: 0.0,
            rate_y: 0.2,
            rate_z: 0.0,
        });

        let feedback = gimbal.step(0.1, 0.0);

        assert!((feedback.gyro_y as f64 - 0.02).abs() < 1e-6);
        assert!((feedback.joint_el as f64 - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_vehicle_quat_tracks_heading() {
        let mut vehicle = VehicleModel::new(0.5);

        // 1 s of turning at 0.5 rad/s
        let mut state = VehicleState::default();
        for _ in 0..10 {
            state = vehicle.step(0.1);
        }

        let [w, _, _, z] = state.quat_wxyz;
        assert!((w - (0.25f64).cos()).abs() < 1e-9);
        assert!((z - (0.25f64).sin()).abs() < 1e-9);
    }
}
