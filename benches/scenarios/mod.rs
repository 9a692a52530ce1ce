//! Real-world scenario benchmarks.
//!
//! These run the complete engine the way a host would: one `render()` per
//! block with a number of voices sounding.

mod voices;

pub use voices::bench_voices;
