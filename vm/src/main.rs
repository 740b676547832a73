use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

use fib_vm::{
    config::{Config, VmConfig},
    eval, load_vm, VMOpts,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Opts {
    /// Show execution trace
    #[arg(short, long)]
    trace: bool,

    /// Override the configured step limit
    #[arg(long)]
    max_steps: Option<u64>,

    #[command(flatten)]
    vm: VMOpts,
}

fn setup_logger() -> tracing::subscriber::DefaultGuard {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter)
        .set_default()
}

fn main() -> anyhow::Result<ExitCode> {
    let _guard = setup_logger();
    let opts = Opts::parse();

    let mut config = VmConfig::from_env()?;
    if let Some(max_steps) = opts.max_steps {
        config.max_steps = max_steps;
    }

    let mut vm = load_vm(&opts.vm, &config)?;
    vm.syscalls.enable_stdout();

    let outcome = eval(&mut vm, &config, opts.trace)?;
    info!(
        exit_code = outcome.exit_code,
        traps = ?outcome.traps,
        steps = outcome.steps,
        "done"
    );

    Ok(ExitCode::from(outcome.exit_status()))
}
