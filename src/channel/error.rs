use thiserror::Error;

use crate::orbit::OrbitError;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("orbit error: {0}")]
    Orbit(#[from] OrbitError),
    #[error("time series is empty")]
    EmptySeries,
    #[error("time series is not strictly increasing at index {0}")]
    NonMonotonicTime(usize),
    #[error("invalid time window: {0}")]
    InvalidWindow(String),
    #[error("series length mismatch: {left} vs {right}")]
    ShapeMismatch { left: usize, right: usize },
}
