//! # Data Store

use comms_if::eqpt::gimbal::GimbalControl;
use log::{info, warn};

use crate::est::AttitudeEstimator;
use crate::rate_ctrl;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the gimbal has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    TcClientNotConnected,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub elapsed_time_s: f64,

    // Safe mode variables
    /// Determines if the gimbal is in safe mode. While safe no control
    /// messages are dispatched.
    pub safe: bool,

    /// Gives the reason for the gimbal being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Operator demands
    /// Latest normalised tilt demand, retained between TCs.
    pub tilt_dem_norm: f64,

    // RateCtrl
    pub rate_ctrl: rate_ctrl::RateCtrl,
    pub rate_ctrl_input: rate_ctrl::InputData,
    pub rate_ctrl_output: Option<GimbalControl>,
    pub rate_ctrl_status_rpt: rate_ctrl::StatusReport,

    /// Latest vehicle attitude snapshot, retained between state messages.
    pub vehicle_data: rate_ctrl::VehicleData,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create a new data store wrapping RateCtrl around the given estimator.
    pub fn new(estimator: Box<dyn AttitudeEstimator>) -> Self {
        Self {
            num_cycles: 0,
            is_1_hz_cycle: false,
            elapsed_time_s: 0.0,
            safe: false,
            safe_cause: None,
            tilt_dem_norm: 0.0,
            rate_ctrl: rate_ctrl::RateCtrl::new(estimator),
            rate_ctrl_input: rate_ctrl::InputData::default(),
            rate_ctrl_output: None,
            rate_ctrl_status_rpt: rate_ctrl::StatusReport::default(),
            vehicle_data: rate_ctrl::VehicleData::default(),
            num_consec_cycle_overruns: 0,
        }
    }

    /// Puts the gimbal into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            // Make rate_ctrl safe
            self.rate_ctrl.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        if self.num_cycles % (cycle_frequency_hz as u128) == 0 {
            self.is_1_hz_cycle = true;
        } else {
            self.is_1_hz_cycle = false;
        }

        self.rate_ctrl_input = rate_ctrl::InputData::default();
        self.rate_ctrl_output = None;
        self.rate_ctrl_status_rpt = rate_ctrl::StatusReport::default();

        self.elapsed_time_s = util::session::get_elapsed_seconds();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::est::DeltaIntegrator;

    #[test]
    fn test_safe_mode_cause_matching() {
        let mut ds = DataStore::new(Box::new(DeltaIntegrator::new()));

        ds.make_safe(SafeModeCause::TcClientNotConnected);
        assert!(ds.safe);

        // A different cause must not clear safe mode
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_err());
        assert!(ds.safe);

        // The root cause does
        assert!(ds
            .make_unsafe(SafeModeCause::TcClientNotConnected)
            .is_ok());
        assert!(!ds.safe);
    }

    #[test]
    fn test_make_unsafe_when_not_safe_is_ok() {
        let mut ds = DataStore::new(Box::new(DeltaIntegrator::new()));
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_ok());
    }
}
