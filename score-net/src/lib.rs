// score-net/src/lib.rs

//! Remote pitch service for sound2score.
//!
//! A drop-in alternative to the local analyzer + note mapper pair:
//! the blocking [`BackendClient`] implements score-core's
//! `RemoteDetector` seam, and [`PitchServer`] answers with the very
//! same score-core routines, so remote and local results agree
//! numerically by construction. Transport is length-prefixed JSON
//! over TCP.

pub mod client;
pub mod framing;
pub mod protocol;
pub mod server;

pub use client::BackendClient;
pub use protocol::{Request, Response};
pub use server::PitchServer;
