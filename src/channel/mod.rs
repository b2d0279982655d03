mod calculator;
mod error;
mod ground_station;
mod polar_pass;
mod sample;
pub mod timeline;

pub use calculator::{propagated_series, DownlinkChannel};
pub use error::ChannelError;
pub use ground_station::{GroundStation, LookAngles};
pub use sample::{joint_mask, ChannelSample, ChannelSeries};
