mod budget;
mod error;
mod pairs;

pub use budget::{end_to_end, to_db, LinkParameters};
pub use error::LinkError;
pub use pairs::{cumulative_pairs, memory_pair_rate, raw_pair_rate, PairStatistics};
