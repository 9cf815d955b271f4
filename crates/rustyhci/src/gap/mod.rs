pub mod constants;
pub mod features;
pub mod types;

pub use constants::*;
pub use features::FeatureIterator;
pub use types::*;
