// Utility functions

pub mod fallback;
pub mod retry;

pub use fallback::*;
pub use retry::*;
