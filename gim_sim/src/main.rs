//! Gimbal simulator executable entry point.
//!
//! Stands in for the gimbal equipment and the vehicle attitude source so
//! that `gim_exec` can be run against a closed loop on a desk: publishes
//! feedback and vehicle state at the configured rate, and actuates the rate
//! control messages it receives.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod model;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::{
    eqpt::gimbal::GimbalControl,
    net::{zmq, MonitoredSocket, NetParams, SocketOptions},
};
use model::{GimbalModel, VehicleModel};
use params::GimSimParams;
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("gim_sim", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Gimbal Simulator\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;
    let sim_params: GimSimParams =
        util::params::load("gim_sim.toml").wrap_err("Could not load sim params")?;

    info!("Sim parameters loaded");

    // ---- INITIALISE NETWORK ----

    let zmq_ctx = zmq::Context::new();

    // The simulator binds the streams it publishes and connects to the
    // control stream published by the executable
    let pub_options = || SocketOptions {
        bind: true,
        block_on_first_connect: false,
        connect_timeout: 1000,
        linger: 1,
        recv_timeout: 10,
        send_timeout: 10,
        ..Default::default()
    };
    let sub_options = SocketOptions {
        block_on_first_connect: false,
        connect_timeout: 1000,
        linger: 1,
        recv_timeout: 10,
        send_timeout: 10,
        ..Default::default()
    };

    let feedback_socket = MonitoredSocket::new(
        &zmq_ctx,
        zmq::PUB,
        pub_options(),
        &net_params.feedback_endpoint,
    )
    .wrap_err("Failed to create the feedback socket")?;

    let vehicle_socket = MonitoredSocket::new(
        &zmq_ctx,
        zmq::PUB,
        pub_options(),
        &net_params.vehicle_endpoint,
    )
    .wrap_err("Failed to create the vehicle socket")?;

    let control_socket = MonitoredSocket::new(
        &zmq_ctx,
        zmq::SUB,
        sub_options,
        &net_params.control_endpoint,
    )
    .wrap_err("Failed to create the control socket")?;

    info!("Network initialisation complete");

    // ---- INITIALISE MODELS ----

    let mut gimbal = GimbalModel::new(sim_params.initial_joint_angles_rad);
    let mut vehicle = VehicleModel::new(sim_params.vehicle_yaw_rate_rads);

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        let cycle_start_instant = Instant::now();

        // ---- CONTROL INPUT ----

        // Drain the control stream, actuating the latest demand
        loop {
            match control_socket.recv_string(0) {
                Ok(Ok(control_str)) => {
                    match serde_json::from_str::<GimbalControl>(&control_str) {
                        Ok(control) => gimbal.set_rate_demand(&control),
                        Err(e) => warn!("Could not parse control message: {}", e),
                    }
                }
                Ok(Err(_)) => warn!("Recieved a non UTF-8 control message"),
                Err(zmq::Error::EAGAIN) => break,
                Err(e) => {
                    warn!("Control socket error: {}", e);
                    break;
                }
            }
        }

        // ---- MODEL PROPAGATION ----

        let vehicle_state = vehicle.step(sim_params.cycle_period_s);
        let feedback = gimbal.step(
            sim_params.cycle_period_s,
            vehicle_state.yaw_rate_earth_rads,
        );

        // ---- PUBLISH ----

        match serde_json::to_string(&feedback) {
            Ok(s) => {
                if let Err(e) = feedback_socket.send(&s, 0) {
                    warn!("Could not send feedback: {}", e);
                }
            }
            Err(e) => warn!("Could not serialize feedback: {}", e),
        }

        match serde_json::to_string(&vehicle_state) {
            Ok(s) => {
                if let Err(e) = vehicle_socket.send(&s, 0) {
                    warn!("Could not send vehicle state: {}", e);
                }
            }
            Err(e) => warn!("Could not serialize vehicle state: {}", e),
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match Duration::from_secs_f64(sim_params.cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - sim_params.cycle_period_s
            ),
        }
    }
}
