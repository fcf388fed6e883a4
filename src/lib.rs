//! fxconv library exports for the binary and for testing

pub mod core;
pub mod currency;
pub mod environment;
pub mod networking;

#[cfg(test)]
pub mod test_support;
