//! # Equipment Messages
//!
//! Messages exchanged with equipment external to the control executable: the
//! gimbal itself and the vehicle attitude source.

pub mod gimbal;
pub mod vehicle;

pub use gimbal::{GimbalControl, GimbalFeedback};
pub use vehicle::VehicleState;
