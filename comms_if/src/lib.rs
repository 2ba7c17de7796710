//! # Communications Interface
//!
//! This library defines the messages exchanged between the gimbal software
//! executables (wire formats for equipment feedback and control, vehicle
//! state, and telecommands), along with the network layer used to move them.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod eqpt;
pub mod net;
pub mod tc;
