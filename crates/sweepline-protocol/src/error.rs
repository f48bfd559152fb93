//! Error types for the protocol layer.
//!
//! Each crate in Sweepline defines its own error enum. A `ProtocolError`
//! always means the bytes themselves were wrong (or would have been): a
//! truncated frame, a buffer sized incorrectly for an outbound message,
//! or an outbound request that cannot be expressed on the wire.

/// Errors that can occur while reading or writing frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// A read ran past the end of the frame.
    ///
    /// This is never recoverable for the frame being decoded: every
    /// field after the failed one would be read from the wrong offset.
    #[error("buffer exhausted at offset {offset}: needed {needed} bytes, frame is {len} bytes")]
    BufferExhausted {
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// A write ran past the end of a pre-sized output buffer.
    #[error("buffer overflow at offset {offset}: writing {needed} bytes into {len}-byte buffer")]
    BufferOverflow {
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// An outbound buffer was finished before every byte was written.
    #[error("buffer under-filled: wrote {written} of {len} bytes")]
    BufferUnderfilled { written: usize, len: usize },

    /// A string field did not hold valid UTF-8.
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    /// A string is longer than its `u16` length prefix can describe.
    #[error("string of {0} bytes exceeds the 65535-byte limit")]
    StringTooLong(usize),

    /// A settings-update message carried a setting code we don't know.
    /// The payload width is unknown, so the rest of the frame is lost.
    #[error("unknown setting code {0}")]
    UnknownSetting(i32),

    /// A repeated-field count was negative.
    #[error("negative count {0}")]
    NegativeCount(i32),

    /// A board or window dimension was negative or too large to allocate.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// A partial settings update had no field set, so there is nothing
    /// to encode.
    #[error("settings patch has no field set")]
    EmptySettingsPatch,
}
