//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use comms_if::tc::GimbalTc;
use gim_lib::data_store::{DataStore, SafeModeCause};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
pub(crate) fn exec(ds: &mut DataStore, tc: &GimbalTc) {
    // Handle different Tcs
    match tc {
        GimbalTc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        }
        GimbalTc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        }
        GimbalTc::TiltDemand { dem_norm } => {
            // Non-finite demands are rejected here so downstream code can
            // assume the stored demand is usable
            if dem_norm.is_finite() {
                ds.tilt_dem_norm = *dem_norm;
            } else {
                warn!("Recieved a non-finite tilt demand, ignored");
            }
        }
    }
}
