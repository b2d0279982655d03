use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrbitError {
    #[error("satellite has no orbit descriptor configured")]
    Unconfigured,
    #[error("polar-pass orbits have no propagator; use the closed-form channel model")]
    ClosedFormOnly,
    #[error("invalid tle format")]
    InvalidTleFormat,
    #[error("invalid tle: {0}")]
    InvalidTle(String),
    #[error("invalid orbital elements: {0}")]
    InvalidElements(String),
    #[error("propagation error: {0}")]
    Propagation(String),
}
