pub mod http_service;

pub use http_service::HttpReputationService;
