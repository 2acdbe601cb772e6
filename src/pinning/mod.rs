//! Pinning Service & IPFS Gateway
//!
//! Thin clients over the third-party content-addressed storage the
//! registry relies on: the pinning API for writing small JSON documents
//! (chat snapshots, inboxes, user profiles) and the public gateway for
//! reading anything back by CID. Neither is reimplemented here; both fail
//! soft so the rest of the service can fall back to local data.

pub mod client;
pub mod gateway;

pub use client::{PinningClient, PinningConfig, PinningError};
pub use gateway::{GatewayClient, GatewayConfig};
