//! Satellite-to-ground free-space optical downlink modelling: orbit
//! propagation, channel geometry, atmospheric transmittance and the
//! end-to-end link budget for entanglement distribution.

pub mod atmosphere;
pub mod channel;
pub mod config;
pub mod geometry;
pub mod link;
pub mod orbit;
pub mod scenario;

#[cfg(test)]
mod test_support;
