//! Pipeline copy CLI.
//!
//! Copies a file byte-for-byte through the kernel's producer/consumer
//! pipeline.
//!
//! ```bash
//! rtkernel input.bin output.bin
//! rtkernel input.bin output.bin --mode coordinated --time-slice-ms 100
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rtkernel::kernel::{ExecutionMode, Scheduler, SchedulerConfig};
use rtkernel::{io, KernelResult};

#[derive(Parser)]
#[command(name = "rtkernel")]
#[command(version)]
#[command(about = "Copy a byte stream through a semaphore-scheduled producer/consumer pipeline")]
struct Cli {
    /// Source file to read
    input: PathBuf,

    /// Sink file to write
    output: PathBuf,

    /// How to drive the two roles
    #[arg(long, value_enum, default_value = "concurrent")]
    mode: ModeArg,

    /// Pause between coordinated steps, in milliseconds
    #[arg(long, default_value_t = 100)]
    time_slice_ms: u64,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Concurrent,
    Coordinated,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    if let Err(err) = run(&cli) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> KernelResult<()> {
    // Open both streams up front: a failed open reports and exits before
    // any partial output can exist.
    let mut source = io::open_source(&cli.input)?;
    let mut sink = io::open_sink(&cli.output)?;

    let config = SchedulerConfig {
        mode: match cli.mode {
            ModeArg::Concurrent => ExecutionMode::Concurrent,
            ModeArg::Coordinated => ExecutionMode::Coordinated,
        },
        time_slice: match cli.mode {
            ModeArg::Coordinated => Duration::from_millis(cli.time_slice_ms),
            ModeArg::Concurrent => Duration::ZERO,
        },
    };

    Scheduler::new(config).run(&mut source, &mut sink)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
