use anyhow::Context;
use clap::Parser;
use std::io::IsTerminal;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lab_health::cli::Cli;
use lab_health::metrics::SharedShell;
use lab_health::runner::{config::Options, factory};
use lab_health::shell::LocalShell;
use lab_health::utils::LabHealthError;

const LOG_ENV_VAR: &str = "LAB_HEALTH_LOG";
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        let code = match e.downcast_ref::<LabHealthError>() {
            Some(LabHealthError::Interrupted) => EXIT_INTERRUPTED,
            _ => 1,
        };
        std::process::exit(code);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let file_options = match &cli.config {
        Some(path) => Options::from_file(path)?,
        None => Options::default(),
    };
    let options = file_options.merge(cli.options());

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        eprintln!("\nCtrl+C received, stopping after the current metric...");
    })
    .context("installing Ctrl-C handler")?;

    let shell: SharedShell = Rc::new(LocalShell::new());
    let runner = factory::build_runner(&options, shell)?.with_interrupt(interrupted);
    runner.run()?;
    Ok(())
}
