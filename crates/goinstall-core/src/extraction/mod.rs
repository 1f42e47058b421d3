//! Archive extraction.
//!
//! [`Extractor`] owns the configuration and the injected filesystem and
//! codec. Each call to [`Extractor::extract`] builds a fresh session that
//! holds the destination and the running quota counters, then walks the
//! archive one entry at a time:
//!
//! 1. check the cancellation flag
//! 2. read the next header
//! 3. enforce quotas on the declared sizes
//! 4. validate the entry name and its joined target
//! 5. dispatch on the entry type

mod engine;
mod entry;
mod session;

pub use engine::Extractor;
