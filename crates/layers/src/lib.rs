pub mod eligibility;
pub mod layer;
pub mod registry;
pub mod sublayers;

pub use eligibility::*;
pub use layer::*;
pub use registry::*;
pub use sublayers::*;
