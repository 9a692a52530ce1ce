use thiserror::Error;

/// Configuration errors reported by the out-of-band setup calls.
///
/// Nothing on the render or control-event path returns these; realtime code
/// ignores malformed input and relies on the output guard for numeric faults.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("block size hint must be between 1 and {max}, got {0}", max = crate::MAX_BLOCK_SIZE)]
    InvalidBlockSize(usize),

    #[error("parameter `{name}` is out of range: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}
