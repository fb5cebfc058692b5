//! Point "identify" queries: which features are under the cursor, across
//! remote feature-info services and client-held vector data.

pub mod aggregate;
pub mod attribution;
pub mod config;
pub mod engine;
pub mod error;

pub use aggregate::*;
pub use attribution::*;
pub use config::*;
pub use engine::*;
pub use error::*;
