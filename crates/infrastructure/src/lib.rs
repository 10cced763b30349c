//! Cascade DNS Infrastructure Layer
//!
//! Adapters for the application ports: the in-memory answer cache, the
//! upstream forwarder and its transports, and the wire-level request handler.
pub mod dns;
