use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AtmosphereError, TransmittanceModel};

/// Upper bound on rows produced by [`TransmittanceTable::tabulate`].
pub const MAX_TABULATED_ROWS: usize = 1_000_000;

#[derive(Debug, Deserialize, Serialize)]
struct Row {
    zenith_deg: f64,
    transmittance: f64,
}

/// Zenith angle → atmospheric transmittance, tabulated offline.
///
/// Lookups interpolate linearly between rows. Queries outside the tabulated
/// angle range saturate at the first/last row instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmittanceTable {
    zenith_deg: Vec<f64>,
    transmittance: Vec<f64>,
}

impl TransmittanceTable {
    pub fn new(pairs: Vec<(f64, f64)>) -> Result<Self, AtmosphereError> {
        if pairs.is_empty() {
            return Err(AtmosphereError::EmptyTable);
        }
        for (row, (angle, value)) in pairs.iter().enumerate() {
            if !angle.is_finite() || !value.is_finite() {
                return Err(AtmosphereError::NotFinite(row));
            }
            if !(0.0..=1.0).contains(value) {
                return Err(AtmosphereError::OutOfRange { row, value: *value });
            }
            if row > 0 && *angle <= pairs[row - 1].0 {
                return Err(AtmosphereError::NotAscending(row));
            }
        }

        let (zenith_deg, transmittance) = pairs.into_iter().unzip();
        Ok(Self {
            zenith_deg,
            transmittance,
        })
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, AtmosphereError> {
        let path = path.as_ref();
        let table = Self::from_csv_reader(std::fs::File::open(path)?)?;
        log::info!(
            "Loaded {} transmittance rows from {} ({}..{} deg)",
            table.len(),
            path.display(),
            table.zenith_deg[0],
            table.zenith_deg[table.len() - 1]
        );
        Ok(table)
    }

    /// Two columns, zenith angle (deg) then transmittance, after one header row.
    /// Header names are not interpreted.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AtmosphereError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut pairs = Vec::new();
        for record in rdr.records() {
            let row: Row = record?.deserialize(None)?;
            pairs.push((row.zenith_deg, row.transmittance));
        }
        Self::new(pairs)
    }

    /// Sample a model on `start..=end` every `step` degrees, the way tables are
    /// produced from an atmospheric code.
    pub fn tabulate<M>(model: &M, start_deg: f64, end_deg: f64, step_deg: f64) -> Result<Self, AtmosphereError>
    where
        M: TransmittanceModel + ?Sized,
    {
        let bad_grid = !(start_deg.is_finite() && end_deg.is_finite() && step_deg.is_finite())
            || step_deg <= 0.0
            || end_deg < start_deg;
        if bad_grid {
            return Err(AtmosphereError::InvalidGrid {
                start_deg,
                end_deg,
                step_deg,
            });
        }

        let steps = ((end_deg - start_deg) / step_deg + 1e-9).floor();
        let count = Some(steps)
            .filter(|n| n.is_finite() && *n < MAX_TABULATED_ROWS as f64)
            .and_then(|n| (n as usize).checked_add(1))
            .ok_or(AtmosphereError::TooManyRows {
                rows: steps + 1.0,
                max: MAX_TABULATED_ROWS,
            })?;
        let pairs = (0..count)
            .map(|k| {
                let angle = start_deg + k as f64 * step_deg;
                (angle, model.transmittance_at(angle))
            })
            .collect();
        Self::new(pairs)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), AtmosphereError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for (zenith_deg, transmittance) in self.zenith_deg.iter().zip(&self.transmittance) {
            wtr.serialize(Row {
                zenith_deg: *zenith_deg,
                transmittance: *transmittance,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.zenith_deg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zenith_deg.is_empty()
    }

    pub fn interpolate(&self, zenith_deg: f64) -> f64 {
        let x = &self.zenith_deg;
        let y = &self.transmittance;
        let last = x.len() - 1;

        if zenith_deg.is_nan() {
            return f64::NAN;
        }
        if zenith_deg <= x[0] {
            return y[0];
        }
        if zenith_deg >= x[last] {
            return y[last];
        }

        // first index with x[i] > zenith_deg; 1..=last here
        let i = x.partition_point(|v| *v <= zenith_deg);
        let (x0, x1) = (x[i - 1], x[i]);
        let (y0, y1) = (y[i - 1], y[i]);
        y0 + (y1 - y0) * (zenith_deg - x0) / (x1 - x0)
    }

    /// Transmittance for each elevation (deg), zenith = 90 - elevation.
    pub fn lookup(&self, elevation_deg: &[f64]) -> Vec<f64> {
        elevation_deg
            .iter()
            .map(|e| self.interpolate(90.0 - e))
            .collect()
    }
}

impl TransmittanceModel for TransmittanceTable {
    fn transmittance_at(&self, zenith_deg: f64) -> f64 {
        self.interpolate(zenith_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn two_point() -> TransmittanceTable {
        TransmittanceTable::new(vec![(0.0, 1.0), (60.0, 0.0)]).unwrap()
    }

    #[test]
    fn interpolates_linearly() {
        let table = two_point();
        assert_abs_diff_eq!(table.interpolate(30.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(table.interpolate(15.0), 0.75, epsilon = 1e-12);
        assert_eq!(table.interpolate(60.0), 0.0);
    }

    #[test]
    fn out_of_range_queries_clamp_to_edges() {
        let table = two_point();
        assert_eq!(table.interpolate(-5.0), 1.0);
        assert_eq!(table.interpolate(70.0), 0.0);
        assert_eq!(table.interpolate(f64::INFINITY), 0.0);
    }

    #[test]
    fn lookup_converts_elevation_to_zenith() {
        let table = two_point();
        let t = table.lookup(&[90.0, 60.0, 10.0, f64::NAN]);
        assert_abs_diff_eq!(t[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t[1], 0.5, epsilon = 1e-12);
        assert_eq!(t[2], 0.0);
        assert!(t[3].is_nan());
    }

    #[test]
    fn multi_row_lookup_picks_the_right_segment() {
        let table =
            TransmittanceTable::new(vec![(0.0, 0.9), (10.0, 0.8), (20.0, 0.6), (30.0, 0.2)])
                .unwrap();
        assert_abs_diff_eq!(table.interpolate(10.0), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(table.interpolate(25.0), 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(table.interpolate(5.0), 0.85, epsilon = 1e-12);
    }

    #[test]
    fn single_row_table_is_constant() {
        let table = TransmittanceTable::new(vec![(30.0, 0.7)]).unwrap();
        assert_eq!(table.interpolate(0.0), 0.7);
        assert_eq!(table.interpolate(80.0), 0.7);
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(matches!(
            TransmittanceTable::new(vec![]),
            Err(AtmosphereError::EmptyTable)
        ));
        assert!(matches!(
            TransmittanceTable::new(vec![(0.0, 0.5), (0.0, 0.4)]),
            Err(AtmosphereError::NotAscending(1))
        ));
        assert!(matches!(
            TransmittanceTable::new(vec![(0.0, 1.5)]),
            Err(AtmosphereError::OutOfRange { row: 0, .. })
        ));
    }

    #[test]
    fn reads_csv_with_header() {
        let csv = "Zenith Angle (degrees),Transmission at 810 nm\n0.0,0.9\n 30.0 , 0.7\n60.0,0.3\n";
        let table = TransmittanceTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_abs_diff_eq!(table.interpolate(45.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn tabulate_rejects_oversized_and_degenerate_grids() {
        let model = |_: f64| 0.5;
        assert!(matches!(
            TransmittanceTable::tabulate(&model, 0.0, 60.0, 1e-300),
            Err(AtmosphereError::TooManyRows { .. })
        ));
        assert!(matches!(
            TransmittanceTable::tabulate(&model, 0.0, 60.0, 1e-9),
            Err(AtmosphereError::TooManyRows { .. })
        ));
        assert!(matches!(
            TransmittanceTable::tabulate(&model, 0.0, 60.0, 0.0),
            Err(AtmosphereError::InvalidGrid { .. })
        ));
        assert!(matches!(
            TransmittanceTable::tabulate(&model, 60.0, 0.0, 0.1),
            Err(AtmosphereError::InvalidGrid { .. })
        ));
        assert!(matches!(
            TransmittanceTable::tabulate(&model, 0.0, f64::INFINITY, 0.1),
            Err(AtmosphereError::InvalidGrid { .. })
        ));
        assert_eq!(TransmittanceTable::tabulate(&model, 5.0, 5.0, 0.1).unwrap().len(), 1);
    }

    #[test]
    fn tabulated_model_round_trips_through_csv() {
        let model = |z: f64| 0.8f64.powf(1.0 / z.to_radians().cos());
        let table = TransmittanceTable::tabulate(&model, 0.0, 60.0, 0.1).unwrap();
        assert_eq!(table.len(), 601);

        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let back = TransmittanceTable::from_csv_reader(buf.as_slice()).unwrap();
        assert_eq!(back.len(), 601);
        assert_abs_diff_eq!(back.interpolate(60.0), 0.64, epsilon = 1e-9);
    }
}
