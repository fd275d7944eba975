//! DNS Reputation Application Layer
//!
//! Ports to the outside world (remote service, domain sources, report
//! writers), the shared lookup services (cache, rate limiter, lookup client)
//! and the use cases driving a batch run.
pub mod ports;
pub mod services;
pub mod use_cases;
