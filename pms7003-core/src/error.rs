/// Errors produced by the `pms7003-core` crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// The frame did not begin with the `BM` start marker.
    #[error("missing start marker: got {found:02x?}")]
    MissingStartMarker { found: [u8; 2] },

    /// The frame checksum did not match the byte sum of its contents.
    #[error("checksum mismatch: frame says {expected:#06x}, computed {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    /// The frame length field was not the fixed data frame length.
    #[error("invalid frame length {value}: expected 28")]
    InvalidFrameLength { value: u16 },

    /// A sensor mode name could not be parsed.
    #[error("invalid mode '{value}': expected 'active' or 'passive'")]
    InvalidMode { value: String },
}

impl CoreError {
    /// Short machine-readable label, suitable for a metrics label value.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::MissingStartMarker { .. } => "start_marker",
            CoreError::ChecksumMismatch { .. } => "checksum",
            CoreError::InvalidFrameLength { .. } => "frame_length",
            CoreError::InvalidMode { .. } => "mode",
        }
    }
}
