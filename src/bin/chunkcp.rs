use std::fs::File;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::{error, info};

use workpool::chunk::copy_chunked;
use workpool::{PoolConfig, Result};

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Parser)]
#[command(name = "chunkcp", version, about = "Copy a file in chunks with a worker pool")]
struct Cli {
    /// File to copy
    src: PathBuf,

    /// Destination file, truncated if it exists
    dst: PathBuf,

    /// Number of workers, defaults to the number of CPUs
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_name = "BYTES")]
    chunk_size: usize,

    /// JSON pool configuration; --workers overrides its worker count
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(e) => {
            error!("{}", e);
            exit(1);
        }
    }
}

/// Returns `false` if any chunk failed.
fn run(cli: Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => PoolConfig::from_reader(File::open(path)?)?,
        None => PoolConfig::default(),
    };
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    info!("chunkcp {}", env!("CARGO_PKG_VERSION"));
    let report = copy_chunked(&cli.src, &cli.dst, config, cli.chunk_size)?;

    for (seq, failure) in &report.failed {
        error!("Chunk {} was not written: {}", seq, failure);
    }
    Ok(report.is_complete())
}
