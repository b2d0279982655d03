use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtmosphereError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("transmittance table is empty")]
    EmptyTable,
    #[error("zenith angles must be strictly ascending (row {0})")]
    NotAscending(usize),
    #[error("row {row}: transmittance {value} outside [0, 1]")]
    OutOfRange { row: usize, value: f64 },
    #[error("row {0}: non-finite value")]
    NotFinite(usize),
    #[error("invalid tabulation grid {start_deg}..{end_deg} step {step_deg}")]
    InvalidGrid {
        start_deg: f64,
        end_deg: f64,
        step_deg: f64,
    },
    #[error("tabulation would produce {rows} rows, limit is {max}")]
    TooManyRows { rows: f64, max: usize },
}
