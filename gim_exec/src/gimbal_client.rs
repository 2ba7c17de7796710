//! # Gimbal Client
//!
//! Client for the gimbal equipment itself: subscribes to the feedback stream
//! published by the gimbal and publishes rate control messages back to it.
//! Both directions are fire-and-forget, there is no acknowledgement of a
//! control message beyond the next feedback message arriving.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::gimbal::{GimbalControl, GimbalFeedback},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Gimbal equipment client
pub struct GimbalClient {
    feedback_socket: MonitoredSocket,
    control_socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GimbalClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the control message: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the gimbal: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the control message: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not parse the recieved feedback message: {0}")]
    FeedbackParseError(serde_json::Error),

    #[error("The gimbal sent a message which was not valid UTF-8")]
    NonUtf8Feedback,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GimbalClient {
    /// Create a new instance of the Gimbal Client.
    ///
    /// This function will not block until the gimbal connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, GimbalClientError> {
        // Create the socket options
        let feedback_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };
        let control_options = SocketOptions {
            bind: true,
            block_on_first_connect: false,
            connect_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        // Connect the sockets, feedback is subscribed from the gimbal, control
        // is published by this executable
        let feedback_socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            feedback_options,
            &params.feedback_endpoint,
        )
        .map_err(GimbalClientError::SocketError)?;

        let control_socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            control_options,
            &params.control_endpoint,
        )
        .map_err(GimbalClientError::SocketError)?;

        // Create self
        Ok(Self {
            feedback_socket,
            control_socket,
        })
    }

    /// Check if the client is connected to the gimbal's feedback stream
    pub fn is_connected(&self) -> bool {
        self.feedback_socket.connected()
    }

    /// Recieve a single feedback message from the gimbal.
    ///
    /// Call in a loop until `Ok(None)` is returned, indicating that there are
    /// no more pending messages. Each message should trigger one control
    /// cycle, so queued messages are drained by cycling once per message
    /// rather than by discarding.
    pub fn recieve_feedback(&self) -> Result<Option<GimbalFeedback>, GimbalClientError> {
        // Attempt to read a string from the socket
        let feedback_str = match self.feedback_socket.recv_string(0) {
            // Valid message
            Ok(Ok(s)) => s,
            // Non UTF-8 message
            Ok(Err(_)) => return Err(GimbalClientError::NonUtf8Feedback),
            // No message in timeout
            Err(zmq::Error::EAGAIN) => return Ok(None),
            // Recieve error
            Err(e) => return Err(GimbalClientError::RecvError(e)),
        };

        // Parse the feedback
        serde_json::from_str(&feedback_str)
            .map(Some)
            .map_err(GimbalClientError::FeedbackParseError)
    }

    /// Send the given control message to the gimbal.
    pub fn send_control(&self, control: &GimbalControl) -> Result<(), GimbalClientError> {
        // Serialise the control message
        let control_str =
            serde_json::to_string(control).map_err(GimbalClientError::SerializationError)?;

        // Send the message
        self.control_socket
            .send(&control_str, 0)
            .map_err(GimbalClientError::SendError)
    }
}
