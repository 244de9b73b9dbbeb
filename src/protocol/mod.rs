//! Typed model of the two protocol exchanges this crate performs.
//!
//! Byte-level encoding is left to the [`BrokerTransport`](crate::connection::BrokerTransport)
//! implementation. The types here are the contract between the admin logic and the transport.

pub mod api_key;
pub mod error;
pub mod messages;
