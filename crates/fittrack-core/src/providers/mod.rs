// Service implementations
pub mod http;

pub use http::HttpFitnessService;
