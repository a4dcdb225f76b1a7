//! Argument parsing for running from the command line

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use dada_utils::{dada::utc_timestamp, DadaConfig, DEFAULT_HEADER_SIZE};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Draw samples from cos(x) with rejection sampling and print the accepted ones
    Sample(SampleArgs),
    /// Write a dada file filled with gaussian noise
    Fake(FakeArgs),
    /// Print the header of a dada file
    Header(HeaderArgs),
}

#[derive(clap::Args, Debug)]
pub struct SampleArgs {
    /// Lower edge of the sampling domain
    #[clap(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub low: f64,
    /// Upper edge of the sampling domain
    #[clap(long, default_value_t = std::f64::consts::FRAC_PI_2, allow_hyphen_values = true)]
    pub high: f64,
    /// Number of candidates to draw (not the number of accepted samples)
    #[clap(short, long, default_value_t = 1000)]
    pub size: usize,
    /// Seed for a reproducible stream
    #[clap(long)]
    pub seed: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct FakeArgs {
    /// Output file, overwritten if it exists
    #[clap(short, long, value_parser)]
    pub out: PathBuf,
    /// Number of frequency channels, 1 writes a single channel time series
    #[clap(long, default_value_t = 256)]
    #[clap(value_parser = clap::value_parser!(u32).range(1..))]
    pub nchan: u32,
    /// Number of time samples
    #[clap(long, default_value_t = 1024)]
    #[clap(value_parser = clap::value_parser!(u32).range(1..))]
    pub nsamps: u32,
    /// Mean of the noise
    #[clap(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub mean: f64,
    /// Standard deviation of the noise
    #[clap(long, default_value_t = 1.0)]
    pub sigma: f64,
    /// Seed for reproducible noise
    #[clap(long)]
    pub seed: Option<u64>,
    #[clap(flatten)]
    pub header: HeaderOptions,
}

#[derive(clap::Args, Debug)]
pub struct HeaderArgs {
    /// Dada file to inspect
    #[clap(value_parser)]
    pub file: PathBuf,
}

/// Everything that goes into the dada header
#[derive(clap::Args, Debug)]
pub struct HeaderOptions {
    #[clap(long, default_value = "MOST")]
    pub telescope: String,
    #[clap(long, default_value = "FAKE")]
    pub source: String,
    /// Center frequency in MHz
    #[clap(long, default_value_t = 835.5957031)]
    pub freq: f64,
    /// Bandwidth in MHz (can be negative)
    #[clap(long, default_value_t = -31.25, allow_hyphen_values = true)]
    pub bw: f64,
    /// Number of polarisations (only 1 is supported)
    #[clap(long, default_value_t = 1)]
    pub npol: u32,
    /// Bits per sample: 8 and 16 are signed integers, 32 is float
    #[clap(long, default_value_t = 32)]
    pub nbit: u32,
    /// Sampling time in seconds
    #[clap(long, default_value_t = 0.00032768)]
    pub tsamp: f64,
    /// UTC_START as YYYY-MM-DD-hh:mm:ss, defaults to now
    #[clap(long)]
    pub utc_start: Option<String>,
    /// TF (time-major) or FT (frequency-major)
    #[clap(long, default_value = "TF")]
    pub order: String,
    /// Dispersion measure in pc cm^-3
    #[clap(long, default_value_t = 0.0)]
    pub dm: f64,
    /// Header size in bytes
    #[clap(long, default_value_t = DEFAULT_HEADER_SIZE)]
    pub header_size: usize,
}

impl HeaderOptions {
    pub fn into_config(self) -> DadaConfig {
        DadaConfig {
            header_size: self.header_size,
            telescope: self.telescope,
            source: self.source,
            freq: self.freq,
            bw: self.bw,
            npol: self.npol,
            nbit: self.nbit,
            tsamp: self.tsamp,
            utc_start: self
                .utc_start
                .unwrap_or_else(|| utc_timestamp(&Utc::now())),
            order: self.order,
            dm: self.dm,
        }
    }
}

/// Match verbosity filter with tracing subscriber log levels
pub fn convert_filter(filter: log::LevelFilter) -> tracing_subscriber::filter::LevelFilter {
    match filter {
        log::LevelFilter::Off => tracing_subscriber::filter::LevelFilter::OFF,
        log::LevelFilter::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        log::LevelFilter::Warn => tracing_subscriber::filter::LevelFilter::WARN,
        log::LevelFilter::Info => tracing_subscriber::filter::LevelFilter::INFO,
        log::LevelFilter::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
        log::LevelFilter::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_defaults_match_config() {
        let args = Args::parse_from([
            "dada_utils",
            "fake",
            "--out",
            "x.dada",
            "--utc-start",
            "2018-02-12-00:00:00",
        ]);
        let Command::Fake(fake) = args.command else {
            panic!("expected the fake subcommand");
        };
        assert_eq!(fake.nchan, 256);
        assert_eq!(fake.header.into_config(), DadaConfig::default());
    }

    #[test]
    fn test_negative_bandwidth() {
        let args = Args::parse_from(["dada_utils", "fake", "-o", "x.dada", "--bw", "-400"]);
        let Command::Fake(fake) = args.command else {
            panic!("expected the fake subcommand");
        };
        assert_eq!(fake.header.bw, -400.0);
        assert!(fake.header.utc_start.is_none());
    }

    #[test]
    fn test_zero_channels_rejected() {
        assert!(Args::try_parse_from(["dada_utils", "fake", "-o", "x", "--nchan", "0"]).is_err());
    }
}
