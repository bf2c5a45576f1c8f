//! Top-level facade crate for FastDog.
//!
//! Re-exports the envelope core and the gateway library so users can depend on a single crate.

pub mod core {
    pub use fastdog_core::*;
}

pub mod gateway {
    pub use fastdog_gateway::*;
}
