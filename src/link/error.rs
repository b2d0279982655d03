use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LinkError {
    #[error("{what}: length mismatch {left} vs {right}")]
    ShapeMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },
    #[error("invalid link parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("timestamps must be strictly increasing (index {0})")]
    NonMonotonicTime(usize),
}

pub(crate) fn ensure_same_len(what: &'static str, left: usize, right: usize) -> Result<(), LinkError> {
    if left != right {
        return Err(LinkError::ShapeMismatch { what, left, right });
    }
    Ok(())
}
