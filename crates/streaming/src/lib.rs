//! Remote feature-info queries: request building, wire encoding and the
//! concurrent dispatcher.

pub mod config;
pub mod pipeline;
pub mod protocol;
pub mod request;
pub mod transport;

pub use config::*;
pub use pipeline::*;
pub use protocol::*;
pub use request::*;
pub use transport::*;
