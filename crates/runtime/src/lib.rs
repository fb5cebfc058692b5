pub mod busy;
pub mod gate;

pub use busy::*;
pub use gate::*;
