use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{op}: vector sizes must match (expected {expected}, found {found})")]
    LengthMismatch {
        op: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Polygon must have at least 3 vertices, got {0}")]
    InvalidPolygon(usize),

    #[error("Swath width must be positive and finite, got {0}")]
    InvalidSwath(f64),

    #[error("Detection tuple must be (class, conf, x1, y1, x2, y2, [ts]), got {0} fields")]
    MalformedDetection(usize),

    #[error("Detection class must be an integral i32, got {0}")]
    InvalidClass(f64),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Checks that every paired input of `op` has `expected` elements.
    pub(crate) fn check_lengths(op: &'static str, expected: usize, found: &[usize]) -> Result<()> {
        match found.iter().find(|&&len| len != expected) {
            Some(&found) => Err(Error::LengthMismatch {
                op,
                expected,
                found,
            }),
            None => Ok(()),
        }
    }
}
