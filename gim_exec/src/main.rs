//! Main gimbal-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand processing and handling
//!         - Vehicle state acquisition
//!         - Rate control processing, one cycle per feedback message
//!         - Control dispatch to the gimbal
//!         - Telemetry output
//!
//! # Modules
//!
//! All modules (e.g. `rate_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use comms_if::{
    eqpt::gimbal::GimbalFeedback,
    net::NetParams,
    tc::{GimbalTc, TcResponse},
};
use gim_lib::{
    data_store::{DataStore, SafeModeCause},
    est::DeltaIntegrator,
    gimbal_client::GimbalClient,
    rate_ctrl,
    tc_client::{TcClient, TcClientError},
    tm_server::{TmPacket, TmServer},
    vehicle_client::VehicleClient,
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{error, info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("gim_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Gimbal Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::new(Box::new(DeltaIntegrator::new()));

    // ---- INITIALISE MODULES ----

    ds.rate_ctrl
        .init("rate_ctrl.toml", &session)
        .wrap_err("Failed to initialise RateCtrl")?;
    info!("RateCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let tc_client = {
        let c = TcClient::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise the TcClient")?;
        info!("TcClient initialised");
        c
    };

    let gimbal_client = {
        let c = GimbalClient::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise GimbalClient")?;
        info!("GimbalClient initialised");
        c
    };

    let vehicle_client = {
        let c = VehicleClient::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise VehicleClient")?;
        info!("VehicleClient initialised");
        c
    };

    let mut tm_server = {
        let s = TmServer::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise TmServer")?;
        info!("TmServer initialised");
        s
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- TELECOMMAND PROCESSING ----

        // If the client is connected remove any safe mode, otherwise make safe
        if tc_client.is_connected() {
            ds.make_unsafe(SafeModeCause::TcClientNotConnected).ok();
        } else {
            ds.make_safe(SafeModeCause::TcClientNotConnected);
        }

        // Get commands until none remain
        loop {
            match tc_client.recieve_tc() {
                Ok(Some(tc)) => {
                    // Branch based on safe mode. If we are in safe mode we need to send the
                    // cannot execute response and should not process the TC, unless it is
                    // the make unsafe TC
                    let response_result = match ds.safe {
                        true => {
                            // Execute TC if make unsafe
                            match tc {
                                GimbalTc::MakeUnsafe => {
                                    tc_processor::exec(&mut ds, &tc);
                                    tc_client.send_response(TcResponse::Ok)
                                }
                                _ => tc_client.send_response(TcResponse::CannotExecute),
                            }
                        }
                        false => {
                            // Process the TC
                            tc_processor::exec(&mut ds, &tc);

                            // Send response
                            tc_client.send_response(TcResponse::Ok)
                        }
                    };

                    // Print warning if couldn't send the response
                    match response_result {
                        Ok(_) => (),
                        Err(e) => warn!("Could not respond to TC: {}", e),
                    }
                }
                Ok(None) => break,
                // If not connected go into safe mode
                Err(TcClientError::NotConnected) => {
                    if !ds.safe {
                        error!("Connection to TcServer lost");
                    }

                    ds.make_safe(SafeModeCause::TcClientNotConnected);
                    break;
                }
                Err(TcClientError::TcParseError(e)) => {
                    warn!("Could not parse recieved TC: {}", e);
                    break;
                }
                Err(e) => {
                    return Err(e).wrap_err("An error occured while receiving TCs from the server")
                }
            }
        }

        // ---- VEHICLE STATE ACQUISITION ----

        // Drain the vehicle state stream, keeping the latest snapshot
        loop {
            match vehicle_client.recieve_state() {
                Ok(Some(data)) => ds.vehicle_data = data,
                Ok(None) => break,
                Err(e) => {
                    warn!("VehicleClient error: {}", e);
                    break;
                }
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // One RateCtrl cycle per queued feedback message, so a backlog is
        // worked through rather than discarded
        let mut num_feedback_msgs = 0;

        loop {
            match gimbal_client.recieve_feedback() {
                Ok(Some(feedback)) => {
                    num_feedback_msgs += 1;
                    cycle_rate_ctrl(&mut ds, &gimbal_client, Some(feedback));
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("GimbalClient error: {}", e);
                    break;
                }
            }
        }

        // Without feedback the target tracker still has to run, and it steps
        // by the feedback period, so cover the whole outer cycle with the
        // equivalent number of steps to keep the slew rate in wall time
        if num_feedback_msgs == 0 {
            let steps = (CYCLE_PERIOD_S / ds.rate_ctrl.delta_time_s())
                .round()
                .max(1.0) as u32;

            for _ in 0..steps {
                cycle_rate_ctrl(&mut ds, &gimbal_client, None);
            }
        }

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            match tm_server.send(&ds) {
                Ok(_) => (),
                Err(e) => warn!("TmServer error: {}", e),
            };

            // Archive the packet in the session for post-run analysis
            session.save(
                format!("tm/cycle_{:08}.json", ds.num_cycles),
                TmPacket::from_datastore(&ds),
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }
}

/// Run one RateCtrl cycle and dispatch the resulting control message.
///
/// Dispatch is suppressed while in safe mode, but processing always runs so
/// the estimator and target tracker stay warm.
fn cycle_rate_ctrl(ds: &mut DataStore, gimbal_client: &GimbalClient, feedback: Option<GimbalFeedback>) {
    ds.rate_ctrl_input = rate_ctrl::InputData {
        feedback,
        tilt_dem_norm: ds.tilt_dem_norm,
        vehicle: ds.vehicle_data,
    };

    match ds.rate_ctrl.proc(&ds.rate_ctrl_input) {
        Ok((output, report)) => {
            ds.rate_ctrl_output = output;
            ds.rate_ctrl_status_rpt = report;
        }
        Err(e) => {
            // A failed cycle drops this feedback message, the next one will
            // run a fresh cycle
            warn!("Error during RateCtrl processing: {}", e);
            return;
        }
    }

    if ds.safe {
        return;
    }

    if let Some(ref control) = ds.rate_ctrl_output {
        match gimbal_client.send_control(control) {
            Ok(_) => (),
            Err(e) => warn!("Could not send the control message: {}", e),
        }
    }
}
