//! # Vehicle Client
//!
//! Subscribes to the vehicle's attitude stream and converts each message into
//! the snapshot format used by RateCtrl. The vehicle publishes at its own
//! rate, the control loop simply uses the latest snapshot it has seen.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::vehicle::VehicleState,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};
use nalgebra::{Quaternion, UnitQuaternion};

use crate::rate_ctrl::VehicleData;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Vehicle attitude client
pub struct VehicleClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum VehicleClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a message from the vehicle: {0}")]
    RecvError(zmq::Error),

    #[error("Could not parse the recieved vehicle state: {0}")]
    StateParseError(serde_json::Error),

    #[error("The vehicle sent a message which was not valid UTF-8")]
    NonUtf8State,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VehicleClient {
    /// Create a new instance of the Vehicle Client.
    ///
    /// This function will not block until the vehicle connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, VehicleClientError> {
        // Create the socket options
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            socket_options,
            &params.vehicle_endpoint,
        )
        .map_err(VehicleClientError::SocketError)?;

        // Create self
        Ok(Self { socket })
    }

    /// Check if the client is connected to the vehicle's state stream
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Recieve a single vehicle state message.
    ///
    /// Call in a loop until `Ok(None)` is returned, keeping the last snapshot
    /// returned as the current vehicle attitude.
    pub fn recieve_state(&self) -> Result<Option<VehicleData>, VehicleClientError> {
        // Attempt to read a string from the socket
        let state_str = match self.socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => return Err(VehicleClientError::NonUtf8State),
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(VehicleClientError::RecvError(e)),
        };

        // Parse the state
        let state: VehicleState =
            serde_json::from_str(&state_str).map_err(VehicleClientError::StateParseError)?;

        Ok(Some(vehicle_data_from_state(&state)))
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert a wire-format vehicle state into the RateCtrl snapshot.
///
/// The quaternion is renormalised on conversion so that small rounding in the
/// wire format cannot accumulate into the attitude matrix.
fn vehicle_data_from_state(state: &VehicleState) -> VehicleData {
    let [w, x, y, z] = state.quat_wxyz;
    let quat = UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z));

    VehicleData {
        yaw_rate_earth_rads: state.yaw_rate_earth_rads,
        attitude_matrix: *quat.to_rotation_matrix().matrix(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Matrix3;

    #[test]
    fn test_identity_state_gives_identity_matrix() {
        let data = vehicle_data_from_state(&VehicleState::default());

        assert_eq!(data.yaw_rate_earth_rads, 0.0);
        assert!((data.attitude_matrix - Matrix3::identity()).norm() < 1e-12);
    }

    #[test]
    fn test_unnormalised_quat_is_renormalised() {
        // 90 degree yaw, scaled by 2
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let state = VehicleState {
            yaw_rate_earth_rads: 0.1,
            quat_wxyz: [2.0 * s, 0.0, 0.0, 2.0 * s],
        };

        let data = vehicle_data_from_state(&state);

        // Body x maps to earth y under a +90 yaw
        let earth_x = data.attitude_matrix * nalgebra::Vector3::new(1.0, 0.0, 0.0);
        assert!((earth_x - nalgebra::Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-9);
    }
}
