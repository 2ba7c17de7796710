//! Implementations for the RateCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::{Matrix3, UnitQuaternion};
use serde::Serialize;

// Internal
use super::{AngleTarget, Measurement, Params, RateCtrlError};
use crate::est::AttitudeEstimator;
use comms_if::eqpt::gimbal::{GimbalControl, GimbalFeedback};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Rate control module state.
///
/// One instance exists per physical gimbal, and all memory carried between
/// control cycles (the stored measurement, the angle target, the yaw rate
/// filter, the previous forward demand and the sequence error counter) lives
/// in its fields.
pub struct RateCtrl {

    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// Measurement decoded from the most recent feedback message.
    pub(crate) measurement: Measurement,

    /// Rate-limited angle target in the vehicle-referenced earth frame.
    pub(crate) angle_target_rad: AngleTarget,

    /// Single-pole low-pass estimate of the vehicle's earth frame yaw rate.
    pub(crate) vehicle_yaw_rate_filt_rads: f64,

    /// Forward demand quaternion from the previous cycle, used by the
    /// feed-forward term.
    pub(crate) last_quat_dem: UnitQuaternion<f64>,

    /// Total number of feedback sequence errors seen. Never reset.
    pub(crate) feedback_error_count: u64,

    /// The injected attitude and gyro bias estimator.
    pub(crate) estimator: Box<dyn AttitudeEstimator>
}

/// Input data to Rate Control.
pub struct InputData {
    /// The feedback message to process, or `None` if no message arrived on
    /// this cycle. Target tracking still runs when there is no feedback.
    pub feedback: Option<GimbalFeedback>,

    /// The latest normalised tilt demand, in [-1, +1].
    pub tilt_dem_norm: f64,

    /// Snapshot of the vehicle attitude for this cycle.
    pub vehicle: VehicleData
}

impl Default for InputData {
    fn default() -> Self {
        Self {
            feedback: None,
            tilt_dem_norm: 0.0,
            vehicle: VehicleData::default()
        }
    }
}

/// Vehicle attitude snapshot used by the yaw centring term.
#[derive(Debug, Clone, Copy)]
pub struct VehicleData {
    /// Vehicle yaw rate in the earth frame.
    ///
    /// Units: radians/second
    pub yaw_rate_earth_rads: f64,

    /// Vehicle orientation matrix (body to earth).
    pub attitude_matrix: Matrix3<f64>
}

impl Default for VehicleData {
    fn default() -> Self {
        Self {
            yaw_rate_earth_rads: 0.0,
            attitude_matrix: Matrix3::identity()
        }
    }
}

/// Status report for RateCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if this cycle's feedback message did not carry the expected
    /// sequence id.
    pub seq_gap: bool,

    /// Total number of sequence errors seen since boot.
    pub feedback_error_count: u64,

    /// True if the estimator reported itself ready this cycle.
    pub estimator_ready: bool,

    /// The tilt angle target after rate limiting.
    ///
    /// Units: radians
    pub tilt_target_rad: f64,

    /// The composed rate demand.
    ///
    /// Units: radians/second
    pub rate_dem_rads: [f64; 3]
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RateCtrl {

    /// Create a new uninitialised RateCtrl instance around the given
    /// estimator.
    ///
    /// `init` must be called before the first `proc`.
    pub fn new(estimator: Box<dyn AttitudeEstimator>) -> Self {
        Self {
            params: Params::default(),
            report: StatusReport::default(),
            measurement: Measurement::default(),
            angle_target_rad: AngleTarget::default(),
            vehicle_yaw_rate_filt_rads: 0.0,
            last_quat_dem: UnitQuaternion::identity(),
            feedback_error_count: 0,
            estimator
        }
    }

    /// The configured feedback period, which is also the control period.
    ///
    /// Units: seconds
    pub fn delta_time_s(&self) -> f64 {
        self.params.delta_time_s
    }

    /// Create a RateCtrl instance directly from a parameter set.
    ///
    /// Used by the benchmarks and the simulator tools, which have no
    /// parameter directory to load from. Executables should use `init`.
    pub fn with_params(params: Params, estimator: Box<dyn AttitudeEstimator>) -> Self {
        let mut rate_ctrl = Self::new(estimator);
        rate_ctrl.params = params;
        rate_ctrl
    }

    /// Put the module into a safe state.
    ///
    /// Clears the dynamic memory feeding the yaw filter and the forward
    /// path, so that leaving safe mode later does not kick the gimbal with a
    /// stale one-step delta.
    pub fn make_safe(&mut self) {
        self.vehicle_yaw_rate_filt_rads = 0.0;
        self.last_quat_dem = UnitQuaternion::from_euler_angles(
            0.0,
            self.angle_target_rad.tilt_rad,
            0.0
        );
    }
}

impl State for RateCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = Option<GimbalControl>;
    type StatusReport = StatusReport;
    type ProcError = RateCtrlError;

    /// Initialise the RateCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e)
        };

        Ok(())
    }

    /// Perform one control cycle of Rate Control.
    ///
    /// Updates the tilt target from the latest demand, then, if a feedback
    /// message was received, decodes it, runs the estimator and composes the
    /// rate demand. The outgoing control message is only produced when the
    /// estimator reports itself ready.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // A zero period means the parameters were never loaded, and would
        // poison the target tracker and feed-forward divisions
        if self.params.delta_time_s <= 0.0 {
            return Err(RateCtrlError::NotInitialised);
        }

        // Clear the status report
        self.report = StatusReport::default();
        self.report.feedback_error_count = self.feedback_error_count;
        self.report.estimator_ready = self.estimator.is_ready();

        // Target tracking runs every cycle from the latest demand
        self.update_tilt_target(input_data.tilt_dem_norm);
        self.report.tilt_target_rad = self.angle_target_rad.tilt_rad;

        // Without a feedback message there is nothing further to do
        let feedback = match input_data.feedback {
            Some(ref f) => f,
            None => return Ok((None, self.report))
        };

        self.decode_feedback(feedback);
        self.report.feedback_error_count = self.feedback_error_count;

        let rate_dem_rads = self.update_rate_demand(&input_data.vehicle);

        // A non-finite demand means bad sensor data got past the estimator,
        // report it rather than dispatching it
        if !rate_dem_rads.iter().all(|v| v.is_finite()) {
            return Err(RateCtrlError::NonFiniteRateDem([
                rate_dem_rads.x,
                rate_dem_rads.y,
                rate_dem_rads.z
            ]));
        }

        self.report.rate_dem_rads = [rate_dem_rads.x, rate_dem_rads.y, rate_dem_rads.z];
        self.report.estimator_ready = self.estimator.is_ready();

        // While the estimator is unconverged the demand must not be sent,
        // but all state above stays warm for when readiness returns
        if !self.report.estimator_ready {
            trace!("Estimator not ready, suppressing control dispatch");
            return Ok((None, self.report));
        }

        let control = GimbalControl {
            target_system: self.params.target_system,
            target_component: self.params.target_component,
            id: self.measurement.id,
            rate_x: rate_dem_rads.x as f32,
            rate_y: rate_dem_rads.y as f32,
            rate_z: rate_dem_rads.z as f32
        };

        trace!(
            "RateCtrl output:\n    rate: {:?}\n    id: {}",
            self.report.rate_dem_rads,
            control.id
        );

        Ok((Some(control), self.report))
    }
}

// ---------------------------------------------------------------------------
// TEST UTILITIES
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use nalgebra::{UnitQuaternion, Vector3};

    /// An estimator double returning scripted values, for deterministic
    /// property tests.
    pub(crate) struct ScriptedEstimator {
        pub quat: UnitQuaternion<f64>,
        pub bias_rads: Vector3<f64>,
        pub ready: bool,
        pub num_updates: u32
    }

    impl AttitudeEstimator for ScriptedEstimator {
        fn update(
            &mut self,
            _dt_s: f64,
            _delta_angles_rad: &Vector3<f64>,
            _delta_velocity_ms: &Vector3<f64>,
            _joint_angles_rad: &Vector3<f64>
        ) {
            self.num_updates += 1;
        }

        fn orientation(&self) -> UnitQuaternion<f64> {
            self.quat
        }

        fn gyro_bias_rads(&self) -> Vector3<f64> {
            self.bias_rads
        }

        fn is_ready(&self) -> bool {
            self.ready
        }
    }

    /// Parameters used by the RateCtrl unit tests.
    pub(crate) fn test_params() -> Params {
        Params {
            delta_time_s: 0.1,
            k_gimbal_rate: 0.1,
            yaw_error_limit_rad: 0.5,
            yaw_rate_filt_pole: 10.0,
            max_tilt_rate_rads: 0.2,
            tilt_angle_min_rad: -1.0,
            tilt_angle_max_rad: 1.0,
            joint_offsets_rad: [0.0; 3],
            target_system: 1,
            target_component: 154
        }
    }

    /// Build an initialised RateCtrl around a scripted estimator.
    pub(crate) fn scripted_rate_ctrl(
        quat: UnitQuaternion<f64>,
        bias_rads: Vector3<f64>,
        ready: bool
    ) -> RateCtrl {
        let mut rc = RateCtrl::new(Box::new(ScriptedEstimator {
            quat,
            bias_rads,
            ready,
            num_updates: 0
        }));
        rc.params = test_params();
        rc
    }

    /// A feedback message with all measurements zeroed.
    pub(crate) fn zero_feedback(id: u8) -> GimbalFeedback {
        GimbalFeedback {
            id,
            gyro_x: 0.0,
            gyro_y: 0.0,
            gyro_z: 0.0,
            acc_x: 0.0,
            acc_y: 0.0,
            acc_z: 0.0,
            joint_roll: 0.0,
            joint_el: 0.0,
            joint_az: 0.0
        }
    }
}

#[cfg(test)]
mod test {
    use super::testing::*;
    use super::*;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn test_sequence_gap_counted_once() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        // Ids 1, 2, 3 are in sequence, 5 skips one
        for id in [1u8, 2, 3, 5].iter() {
            let input = InputData {
                feedback: Some(zero_feedback(*id)),
                ..Default::default()
            };
            let (_, report) = rc.proc(&input).unwrap();
            assert_eq!(report.seq_gap, *id == 5);
        }

        assert_eq!(rc.feedback_error_count, 1);

        // The counter is cumulative and never resets
        let input = InputData {
            feedback: Some(zero_feedback(6)),
            ..Default::default()
        };
        let (_, report) = rc.proc(&input).unwrap();
        assert!(!report.seq_gap);
        assert_eq!(report.feedback_error_count, 1);
    }

    #[test]
    fn test_sequence_id_wraparound() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);
        rc.measurement.id = 255;

        rc.decode_feedback(&zero_feedback(0));
        assert_eq!(rc.feedback_error_count, 0);
    }

    #[test]
    fn test_joint_offsets_subtracted() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);
        rc.params.joint_offsets_rad = [0.01, 0.02, 0.03];

        let mut feedback = zero_feedback(1);
        feedback.joint_roll = 0.11;
        feedback.joint_el = 0.22;
        feedback.joint_az = 0.33;

        rc.decode_feedback(&feedback);

        let joints = rc.measurement.joint_angles_rad;
        assert!((joints.x - 0.1).abs() < 1e-6);
        assert!((joints.y - 0.2).abs() < 1e-6);
        assert!((joints.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_tilt_target_ramp_and_snap() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        // Demand of 0.1 maps to a tilt of 0.1 rad with the test ranges. The
        // rate limit allows 0.02 rad of travel per cycle, so the target ramps
        // for 5 cycles then sits on the demand
        let expected = [0.02, 0.04, 0.06, 0.08, 0.1, 0.1];

        for e in expected.iter() {
            let input = InputData {
                feedback: None,
                tilt_dem_norm: 0.1,
                ..Default::default()
            };
            let (_, report) = rc.proc(&input).unwrap();
            assert!(
                (report.tilt_target_rad - e).abs() < 1e-12,
                "expected target {} got {}",
                e,
                report.tilt_target_rad
            );
        }
    }

    #[test]
    fn test_end_to_end_yaw_centring() {
        // Identity estimate, zero bias, vehicle at rest, yaw joint at
        // 0.2 rad: the demand reduces to the proportional yaw term
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        let mut feedback = zero_feedback(1);
        feedback.joint_az = 0.2;

        let input = InputData {
            feedback: Some(feedback),
            ..Default::default()
        };

        let (output, report) = rc.proc(&input).unwrap();
        let control = output.expect("expected a control message");

        assert_eq!(control.id, 1);
        assert_eq!(control.target_system, 1);
        assert_eq!(control.target_component, 154);

        assert!(control.rate_x.abs() < 1e-9);
        assert!(control.rate_y.abs() < 1e-9);
        assert!((control.rate_z - (-0.02)).abs() < 1e-9);

        assert!(report.estimator_ready);
    }

    #[test]
    fn test_bias_compensation_added() {
        let bias = Vector3::new(0.01, -0.02, 0.03);
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), bias, true);

        let input = InputData {
            feedback: Some(zero_feedback(1)),
            ..Default::default()
        };

        let (output, _) = rc.proc(&input).unwrap();
        let control = output.unwrap();

        // All three terms are zero so the demand is exactly the bias
        assert!((control.rate_x - 0.01).abs() < 1e-9);
        assert!((control.rate_y - (-0.02)).abs() < 1e-9);
        assert!((control.rate_z - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_report_ready_on_feedback_free_cycle() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        // No feedback this cycle, the report must still carry the
        // estimator's readiness
        let (output, report) = rc.proc(&InputData::default()).unwrap();

        assert!(output.is_none());
        assert!(report.estimator_ready);
    }

    #[test]
    fn test_feedback_free_tracking_matches_slew_rate() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);
        rc.params.delta_time_s = 0.02;

        // An outer cycle of 0.1 s is covered by five tracker steps, so the
        // target advances by the full max_tilt_rate * 0.1 of wall time
        let outer_period_s = 0.1;
        let steps = (outer_period_s / rc.delta_time_s()).round() as u32;
        assert_eq!(steps, 5);

        for _ in 0..steps {
            let input = InputData {
                feedback: None,
                tilt_dem_norm: 1.0,
                ..Default::default()
            };
            rc.proc(&input).unwrap();
        }

        let expected = rc.params.max_tilt_rate_rads * outer_period_s;
        assert!((rc.angle_target_rad.tilt_rad - expected).abs() < 1e-12);
    }

    #[test]
    fn test_dispatch_suppressed_while_not_ready() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), false);

        let vehicle = VehicleData {
            yaw_rate_earth_rads: 0.04,
            ..Default::default()
        };
        let input = InputData {
            feedback: Some(zero_feedback(1)),
            tilt_dem_norm: 0.0,
            vehicle
        };

        let (output, report) = rc.proc(&input).unwrap();

        // No command, but decoding and filter state still moved on
        assert!(output.is_none());
        assert!(!report.estimator_ready);
        assert_eq!(rc.measurement.id, 1);
        assert!(rc.vehicle_yaw_rate_filt_rads > 0.0);
    }

    #[test]
    fn test_proc_before_init_errors() {
        let mut rc = RateCtrl::new(Box::new(ScriptedEstimator {
            quat: UnitQuaternion::identity(),
            bias_rads: Vector3::zeros(),
            ready: true,
            num_updates: 0
        }));

        match rc.proc(&InputData::default()) {
            Err(RateCtrlError::NotInitialised) => (),
            other => panic!("expected NotInitialised, got {:?}", other.map(|_| ()))
        }
    }

    #[test]
    fn test_non_finite_demand_reported() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        let mut feedback = zero_feedback(1);
        feedback.joint_az = f32::NAN;

        let input = InputData {
            feedback: Some(feedback),
            ..Default::default()
        };

        match rc.proc(&input) {
            Err(RateCtrlError::NonFiniteRateDem(_)) => (),
            other => panic!("expected NonFiniteRateDem, got {:?}", other.map(|_| ()))
        }
    }
}
