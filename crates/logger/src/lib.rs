//! Shared tracing setup for Uppe binaries.

mod tracing;

pub use self::tracing::{LogFormat, try_init_tracing};
