//! # Gimbal Control Library
//!
//! Library backing the `gim_exec` executable. The core of the software is the
//! [`rate_ctrl`] module, which turns gimbal feedback messages into rate
//! demands for the gimbal's rate servos. The remaining modules provide the
//! attitude estimator interface and the network clients used by the
//! executable.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod data_store;
pub mod est;
pub mod gimbal_client;
pub mod rate_ctrl;
pub mod tc_client;
pub mod tm_server;
pub mod vehicle_client;
