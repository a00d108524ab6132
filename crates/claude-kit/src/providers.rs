pub mod anthropic;
pub mod base;
pub mod configs;
pub mod streaming;
pub mod utils;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
