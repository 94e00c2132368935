use thiserror::Error;

/// Errors produced while assembling a [`CorrespondenceSet`](crate::CorrespondenceSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CorrespondenceError {
    /// Either side has fewer than `minimum` points or the two sides differ in length.
    #[error(
        "invalid correspondence count (sizes: {src}, {dst}); both sets need the same \
         number of points and at least {minimum}"
    )]
    InvalidCorrespondenceCount {
        src: usize,
        dst: usize,
        minimum: usize,
    },
    /// The same label was used twice on one side of a labeled pairing.
    #[error("correspondence label {label} is used more than once")]
    DuplicateLabel { label: u32 },
}

impl CorrespondenceError {
    /// Is this a count violation where the two sides disagree in length?
    ///
    /// Returns `false` for sets that agree in length but are too short.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::InvalidCorrespondenceCount { src, dst, .. } if src != dst)
    }
}
