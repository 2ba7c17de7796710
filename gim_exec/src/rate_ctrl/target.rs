//! Angle target tracking for RateCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::RateCtrl;
use util::maths::{clamp, lin_map};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The demanded gimbal orientation in the vehicle-referenced earth frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngleTarget {
    /// Forward (roll) angle target. Held at zero: vehicle roll is tracked,
    /// not commanded.
    ///
    /// Units: radians
    pub forward_rad: f64,

    /// Tilt (elevation) angle target, ramped towards the operator demand at
    /// no more than the maximum tilt rate.
    ///
    /// Units: radians
    pub tilt_rad: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RateCtrl {

    /// Update the tilt angle target from the latest normalised demand.
    ///
    /// The demand is clamped into [-1, +1] and mapped into the configured
    /// tilt angle range. The target then moves towards the demanded angle at
    /// no more than `max_tilt_rate_rads`, snapping directly onto it once it
    /// is within one cycle's travel.
    pub(crate) fn update_tilt_target(&mut self, dem_norm: f64) {
        let dem_norm = clamp(&dem_norm, &-1.0, &1.0);

        let tilt_rad = lin_map(
            (-1.0, 1.0),
            (self.params.tilt_angle_min_rad, self.params.tilt_angle_max_rad),
            dem_norm
        );

        // Rate required to reach the demanded angle this cycle
        let rate_rads
            = (tilt_rad - self.angle_target_rad.tilt_rad) / self.params.delta_time_s;

        if rate_rads > self.params.max_tilt_rate_rads {
            self.angle_target_rad.tilt_rad +=
                self.params.delta_time_s * self.params.max_tilt_rate_rads;
        }
        else if rate_rads < -self.params.max_tilt_rate_rads {
            self.angle_target_rad.tilt_rad -=
                self.params.delta_time_s * self.params.max_tilt_rate_rads;
        }
        else {
            self.angle_target_rad.tilt_rad = tilt_rad;
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::state::testing::scripted_rate_ctrl;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn test_demand_mapping_at_range_ends() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        // Disable the rate limit so the target snaps straight to the mapped
        // angle
        rc.params.max_tilt_rate_rads = 1.0e6;
        rc.params.tilt_angle_min_rad = -1.5;
        rc.params.tilt_angle_max_rad = 0.3;

        rc.update_tilt_target(-1.0);
        assert!((rc.angle_target_rad.tilt_rad + 1.5).abs() < 1e-12);

        rc.update_tilt_target(1.0);
        assert!((rc.angle_target_rad.tilt_rad - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_demand_clamped_outside_range() {
        let mut rc = scripted_rate_ctrl(UnitQuaternion::identity(), Vector3::zeros(), true);

        rc.params.max_tilt_rate_rads = 1.0e6;

        // Demands beyond the normalised range behave as the nearest end
        rc.update_tilt_target(3.0);
        let at_max = rc.angle_target_rad.tilt_rad;
        assert!((at_max - rc.params.tilt_angle_max_rad).abs() < 1e-12);

        rc.update_tilt_target(-7.5);
        assert!((rc.angle_target_rad.tilt_rad - rc.params.tilt_angle_min_rad).abs() < 1e-12);
    }
}
