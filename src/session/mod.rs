pub mod registry;
pub mod review;

pub use registry::ReviewRegistry;
pub use review::{FinalResult, ReviewOptions, ReviewSession};
