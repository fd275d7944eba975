//! DNS Reputation Infrastructure Layer
//!
//! Adapters behind the application ports: capture and list readers, the
//! HTTP reputation client and the report writers.
pub mod capture;
pub mod report;
pub mod reputation;
