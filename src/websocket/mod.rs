//! Live Chat Delivery
//!
//! WebSocket layer for pushing stored chat messages to dashboard clients
//! as they arrive, from local sends and the p2p log alike. Clients
//! subscribe to conversation topics; the hub fans events out.

pub mod handler;
pub mod hub;
pub mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage, WsEvent};
