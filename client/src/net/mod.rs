//! Transport layer: the request dispatcher, its retry bookkeeping, and the
//! single-flight refresh coordination.

pub mod attempt;
pub mod dispatcher;

pub use dispatcher::ApiClient;
