//! Content pipeline conductor.
//!
//! Runs the ingest, ideation, content and validator workers under a
//! phase-based scheduler and writes the resulting pages.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use conductor::core::types::LogEntry;
use conductor::exit_codes;
use conductor::io::config::{DEFAULT_CONFIG_PATH, load_config, write_config};
use conductor::io::export::export_run;
use conductor::looping::run_to_completion;
use conductor::logging;
use conductor::scheduler::Halt;
use conductor::start::{assemble, command_oracle};

#[derive(Parser)]
#[command(
    name = "conductor",
    version,
    about = "Phase-based scheduler for the product content pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default `conductor.toml`.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Run the pipeline until FINISH, a configuration error, or the step budget.
    Run {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Force simulation mode (no oracle calls, deterministic output).
        #[arg(long)]
        simulate: bool,
        /// Override `max_steps` from the config.
        #[arg(long)]
        max_steps: Option<u32>,
        /// Write artifacts, `trace.json` and `errors.json` into this directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the first decision for an empty store without running any worker.
    Plan {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        #[arg(long)]
        simulate: bool,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force, config } => cmd_init(&config, force),
        Command::Run {
            config,
            simulate,
            max_steps,
            out,
        } => cmd_run(&config, simulate, max_steps, out.as_deref()),
        Command::Plan { config, simulate } => cmd_plan(&config, simulate),
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &Default::default())?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_run(
    config_path: &Path,
    simulate: bool,
    max_steps: Option<u32>,
    out: Option<&Path>,
) -> Result<i32> {
    let mut cfg = load_config(config_path)?;
    cfg.simulation_mode |= simulate;
    if let Some(max_steps) = max_steps {
        cfg.max_steps = max_steps;
    }
    let mut run = assemble(&cfg, command_oracle(&cfg))?;

    let outcome = run_to_completion(&mut run.scheduler, &mut run.store, |entries| {
        for entry in entries {
            print_entry(entry);
        }
    })?;

    if let Some(dir) = out {
        for path in export_run(&run.store, dir)? {
            println!("wrote {}", path.display());
        }
    }
    for error in run.store.errors() {
        eprintln!("error: {error}");
    }
    println!("stopped: {:?} after {} steps", outcome.halt, outcome.steps);

    Ok(match outcome.halt {
        Halt::Finished => exit_codes::OK,
        Halt::Errored => exit_codes::ERROR,
        Halt::BudgetExhausted => exit_codes::BUDGET,
    })
}

fn cmd_plan(config_path: &Path, simulate: bool) -> Result<i32> {
    let mut cfg = load_config(config_path)?;
    cfg.simulation_mode |= simulate;
    let mut run = assemble(&cfg, command_oracle(&cfg))?;
    let seen = run.store.log().len();
    run.scheduler.step(&mut run.store);
    for entry in &run.store.log()[seen..] {
        print_entry(entry);
    }
    Ok(match run.scheduler.halt() {
        Some(Halt::Errored) => exit_codes::ERROR,
        _ => exit_codes::OK,
    })
}

fn print_entry(entry: &LogEntry) {
    println!("[{}] {}: {}", entry.timestamp, entry.source, entry.message);
}
