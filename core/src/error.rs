use thiserror::Error;

use crate::grid::CellId;

/// Errors raised by the cell/position codec and the range envelope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The identifier is not a valid cell (at the requested resolution)
    #[error("invalid cell `{cell}'")]
    InvalidCell { cell: CellId },

    /// `base_res > target_res` or a resolution outside `[0, 15]`
    #[error("invalid resolution order: base resolution {base} must not exceed target resolution {target} (maximum is 15)")]
    InvalidResolutionOrder { base: u8, target: u8 },

    /// Digit count does not match the requested resolution or a digit is
    /// out of `[0, 6]`
    #[error("malformed position path: {reason}")]
    MalformedPath { reason: String },

    /// The digit names a child that does not exist under a pentagon
    #[error("position {digit} does not exist below pentagon cell `{parent}' at resolution {resolution}")]
    UnrealizableDigit {
        parent: CellId,
        digit: u8,
        resolution: u8,
    },

    /// Range endpoints were recorded at different resolutions (or at a
    /// resolution coarser than the chunk resolution)
    #[error("resolution mismatch: hex_min is at resolution {min}, hex_max at {max}, chunk resolution is {chunk}")]
    ResolutionMismatch { min: u8, max: u8, chunk: u8 },

    /// Range endpoints do not share an ancestor at the chunk resolution
    #[error("`{hex_min}' and `{hex_max}' do not share an ancestor at resolution {chunk}")]
    AncestorMismatch {
        hex_min: CellId,
        hex_max: CellId,
        chunk: u8,
    },

    /// The range is empty or inverted
    #[error("empty range: position of hex_max ({max_pos}) precedes position of hex_min ({min_pos})")]
    EmptyRange { min_pos: u64, max_pos: u64 },
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        CodecError::MalformedPath {
            reason: reason.into(),
        }
    }
}
