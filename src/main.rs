use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

use qsat_link::atmosphere::{AtmosphereError, TransmittanceTable};
use qsat_link::channel::ChannelError;
use qsat_link::config::{ConfigError, ScenarioConfig};
use qsat_link::geometry::{visible_batch, GeometryError, Vector3, DEFAULT_OCCLUSION_RADIUS_M};
use qsat_link::orbit::Propagation;
use qsat_link::scenario::{Scenario, ScenarioError};

#[derive(Parser)]
#[command(name = "qsat-link")]
#[command(about = "Satellite-to-ground optical downlink channel and link budget")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario file and everything it references
    Validate { scenario: PathBuf },
    /// Per-station channel geometry: visibility and culminations
    Channel {
        scenario: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// End-to-end transmission per station and entangled-pair statistics
    Link {
        scenario: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Line-of-sight check between points (metres, Earth-centred)
    Visible {
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        a: Vector3,
        /// May be repeated
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true, required = true)]
        b: Vec<Vector3>,
        #[arg(long, default_value_t = DEFAULT_OCCLUSION_RADIUS_M)]
        radius: f64,
    },
    /// Write a transmittance table for a clear-sky air-mass model
    Tabulate {
        /// Zenith transmittance of the model
        #[arg(long)]
        zenith_transmittance: f64,
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        #[arg(long, default_value_t = 60.0)]
        end: f64,
        #[arg(long, default_value_t = 0.1)]
        step: f64,
        /// Output CSV (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Scenario(#[from] ScenarioError),
    #[error("{0}")]
    Channel(#[from] ChannelError),
    #[error("{0}")]
    Geometry(#[from] GeometryError),
    #[error("{0}")]
    Atmosphere(#[from] AtmosphereError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { scenario } => validate(&scenario),
        Commands::Channel { scenario, json } => channel(&scenario, json),
        Commands::Link { scenario, json } => link(&scenario, json),
        Commands::Visible { a, b, radius } => visible(a, &b, radius),
        Commands::Tabulate {
            zenith_transmittance,
            start,
            end,
            step,
            output,
        } => tabulate(zenith_transmittance, start, end, step, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load(path: &Path) -> Result<Scenario, CliError> {
    let config = ScenarioConfig::from_file(path)?;
    Ok(Scenario::load(&config)?)
}

fn validate(path: &Path) -> Result<(), CliError> {
    let scenario = load(path)?;

    println!("Scenario is valid");
    let satellite = &scenario.satellite;
    match satellite.propagation() {
        Propagation::Tle(p) => println!("  satellite: {} (TLE, NORAD {})", satellite.name(), p.norad_id()),
        Propagation::Keplerian(p) => println!(
            "  satellite: {} (Keplerian, period {:.1} min)",
            satellite.name(),
            p.period() / 60.0
        ),
        Propagation::PolarPass(o) => println!(
            "  satellite: {} (polar pass, {:.0} km, {:.2} deg)",
            satellite.name(),
            o.altitude_m / 1e3,
            o.inclination_rad.to_degrees()
        ),
        Propagation::Unset => println!("  satellite: {} (unset)", satellite.name()),
    }
    for station in &scenario.stations {
        println!(
            "  station: {} ({:.4}, {:.4}, {:.0} m)",
            station.name, station.latitude_deg, station.longitude_deg, station.altitude_m
        );
    }
    if let (Some(first), Some(last)) = (scenario.times.first(), scenario.times.last()) {
        println!("  window: {} samples, {} .. {}", scenario.times.len(), first, last);
    }
    println!("  transmittance table: {} rows", scenario.table.len());
    println!(
        "  link: {:.0} nm, Rayleigh range {:.1} km",
        scenario.link.wavelength_m * 1e9,
        scenario.link.rayleigh_range_m() / 1e3
    );
    Ok(())
}

fn channel(path: &Path, json: bool) -> Result<(), CliError> {
    let scenario = load(path)?;
    let report = scenario.channel_report()?;

    if json {
        return print_json(&report);
    }
    for station in &report {
        println!(
            "{}: {} samples, {} valid, {} above {} deg",
            station.station, station.samples, station.valid, station.visible, scenario.min_elevation_deg
        );
        for c in &station.culminations {
            println!(
                "  culmination {} elevation {:.2} deg range {:.1} km",
                c.time,
                c.elevation_deg,
                c.range_m / 1e3
            );
        }
    }
    Ok(())
}

fn link(path: &Path, json: bool) -> Result<(), CliError> {
    let scenario = load(path)?;
    let report = scenario.link_report()?;

    if json {
        return print_json(&report);
    }
    for station in &report.stations {
        match (station.min_loss_db, station.mean_loss_db) {
            (Some(best), Some(mean)) => println!(
                "{}: {} visible samples, best loss {:.2} dB, mean loss {:.2} dB",
                station.station, station.visible, best, mean
            ),
            _ => println!("{}: not visible", station.station),
        }
    }
    if let Some(pairs) = &report.pairs {
        println!(
            "{} + {}: {} joint samples ({:.0} s)",
            pairs.stations[0], pairs.stations[1], pairs.joint_samples, pairs.raw.visible_seconds
        );
        println!(
            "  raw:    {:.3e} pairs, peak {:.3e} Hz, mean {:.3e} Hz",
            pairs.raw.total_pairs, pairs.raw.peak_rate_hz, pairs.raw.mean_rate_hz
        );
        println!(
            "  memory: {:.3e} pairs, peak {:.3e} Hz, mean {:.3e} Hz",
            pairs.memory.total_pairs, pairs.memory.peak_rate_hz, pairs.memory.mean_rate_hz
        );
    }
    Ok(())
}

fn visible(a: Vector3, b: &[Vector3], radius: f64) -> Result<(), CliError> {
    let a = vec![a; b.len()];
    for (point, clear) in b.iter().zip(visible_batch(&a, b, radius)?) {
        println!(
            "{:?}: {}",
            point,
            if clear { "visible" } else { "occluded" }
        );
    }
    Ok(())
}

fn tabulate(
    zenith_transmittance: f64,
    start: f64,
    end: f64,
    step: f64,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    if !(0.0..=1.0).contains(&zenith_transmittance) {
        return Err(CliError::Usage(format!(
            "zenith transmittance must be in [0, 1], got {}",
            zenith_transmittance
        )));
    }
    if !(0.0..90.0).contains(&start) || !(0.0..90.0).contains(&end) {
        return Err(CliError::Usage("zenith angles must be in [0, 90)".into()));
    }

    let model = |zenith_deg: f64| zenith_transmittance.powf(1.0 / zenith_deg.to_radians().cos());
    let table = TransmittanceTable::tabulate(&model, start, end, step)?;

    match output {
        Some(path) => {
            table.write_csv(File::create(&path)?)?;
            log::info!("Wrote {} rows to {}", table.len(), path.display());
        }
        None => table.write_csv(io::stdout().lock())?,
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_vector(s: &str) -> Result<Vector3, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{}': {}", p.trim(), e)))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(format!("expected x,y,z, got {} components", parts.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vectors() {
        assert_eq!(parse_vector("7e6, 0, -1.5").unwrap(), [7e6, 0.0, -1.5]);
        assert!(parse_vector("1,2").is_err());
        assert!(parse_vector("1,2,x").is_err());
    }

    #[test]
    fn cli_accepts_repeated_points() {
        let cli = Cli::try_parse_from([
            "qsat-link", "visible", "--a", "7e6,0,0", "--b", "7e6,1e5,0", "--b", "-7e6,0,0",
        ])
        .unwrap();
        match cli.command {
            Commands::Visible { b, radius, .. } => {
                assert_eq!(b.len(), 2);
                assert_eq!(radius, DEFAULT_OCCLUSION_RADIUS_M);
            }
            _ => panic!("expected visible"),
        }
    }
}
