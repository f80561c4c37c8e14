//! WebSocket push channel. Clients identify with their JWT and then
//! receive the notifications and booking updates addressed to them.

pub mod connection;
pub mod dispatcher;

pub use dispatcher::Dispatcher;
