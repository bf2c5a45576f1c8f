//! FastDog gateway library entry.
//!
//! Serves scene files as FastDog envelopes and decodes uploaded envelopes
//! over HTTP. The decoder backend is chosen once from config when the state
//! is built. Consumed by the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod assets;
pub mod config;
pub mod error;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod router;
pub mod transport;
