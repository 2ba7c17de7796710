//! # TM Server

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use comms_if::{
    eqpt::gimbal::GimbalControl,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

use crate::data_store::DataStore;
use crate::rate_ctrl;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry server
pub struct TmServer {
    socket: MonitoredSocket,
}

/// Telemetry packet that is output by the server.
#[derive(Debug, Serialize)]
pub struct TmPacket {
    pub elapsed_time_s: f64,

    pub safe: bool,

    pub safe_cause: String,

    pub tilt_dem_norm: f64,

    pub rate_ctrl_output: Option<GimbalControl>,

    pub rate_ctrl_status_rpt: rate_ctrl::StatusReport,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send telemetry: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the telemetry: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmServer {
    /// Create a new instance of the TM Server.
    ///
    /// This function will not block until a telemetry consumer connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, TmServerError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.tm_endpoint)
            .map_err(TmServerError::SocketError)?;

        // Create self
        Ok(Self { socket })
    }

    pub fn send(&mut self, ds: &DataStore) -> Result<(), TmServerError> {
        // Build packet
        let packet = TmPacket::from_datastore(ds);

        // Serialize packet
        let packet_string =
            serde_json::to_string(&packet).map_err(TmServerError::SerializationError)?;

        // Send the packet
        self.socket
            .send(&packet_string, 0)
            .map_err(TmServerError::SendError)
    }
}

impl TmPacket {
    pub fn from_datastore(ds: &DataStore) -> Self {
        Self {
            elapsed_time_s: ds.elapsed_time_s,
            safe: ds.safe,
            safe_cause: format!("{:?}", ds.safe_cause),
            tilt_dem_norm: ds.tilt_dem_norm,
            rate_ctrl_output: ds.rate_ctrl_output,
            rate_ctrl_status_rpt: ds.rate_ctrl_status_rpt,
        }
    }
}
