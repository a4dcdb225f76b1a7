use std::io::{self, Write};

use anyhow::Context;
use args::{Command, FakeArgs, HeaderArgs, SampleArgs};
use clap::Parser;
use dada_utils::{write_dada, Cosine, DadaHeader, RejectionSampler};
use ndarray::{Array1, Array2};
use rand::{rngs::SmallRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::info;

mod args;

fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

fn sample(args: SampleArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.low < args.high,
        "--low ({}) must be below --high ({})",
        args.low,
        args.high
    );
    let mut sampler = RejectionSampler::new(Cosine);
    if let Some(seed) = args.seed {
        sampler = sampler.set_seed(seed);
    }
    let samples = sampler.sample(args.low, args.high, args.size);
    info!(
        "Accepted {} of {} candidates ({:.2}%)",
        samples.len(),
        args.size,
        100.0 * samples.len() as f64 / args.size.max(1) as f64
    );
    let mut stdout = io::stdout().lock();
    for x in samples {
        writeln!(stdout, "{x}")?;
    }
    Ok(())
}

fn fake(args: FakeArgs) -> anyhow::Result<()> {
    let normal = Normal::new(args.mean, args.sigma).context("Invalid noise parameters")?;
    let mut rng = seeded_rng(args.seed);
    let (nchan, nsamps) = (args.nchan as usize, args.nsamps as usize);
    let config = args.header.into_config();
    if nchan == 1 {
        let data = Array1::from_shape_simple_fn(nsamps, || normal.sample(&mut rng));
        write_dada(&data, &args.out, &config)?;
    } else {
        let data = Array2::from_shape_simple_fn((nchan, nsamps), || normal.sample(&mut rng));
        write_dada(&data, &args.out, &config)?;
    }
    Ok(())
}

fn header(args: HeaderArgs) -> anyhow::Result<()> {
    let header = DadaHeader::from_file(&args.file)
        .with_context(|| format!("Reading header of {}", args.file.display()))?;
    let mut stdout = io::stdout().lock();
    for (key, value) in header.fields() {
        writeln!(stdout, "{key:<16}{value}")?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Get the CLI options
    let args = args::Args::parse();
    // Setup logging
    tracing_subscriber::fmt()
        .with_max_level(args::convert_filter(args.verbose.log_level_filter()))
        .init();
    match args.command {
        Command::Sample(args) => sample(args),
        Command::Fake(args) => fake(args),
        Command::Header(args) => header(args),
    }
}
