//! BSP-Core: Foundation types for BioSignal Studio
//!
//! Error taxonomy and the immutable series passed between pipeline stages.

pub mod error;
pub mod series;

pub use series::*;
pub use error::{BspError, BspResult};
