use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use pmash::cli::Cli;
use pmash::config::Config;
use pmash::{PmashContext, commands, output};
use std::io;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            output::error(&output::program_name(), &format!("{e:#}"));
            process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Some(shell) = cli.completions {
        print_completions(shell, &mut Cli::command());
        return Ok(true);
    }

    // clap enforces -c unless --completions was given
    let Some(command) = cli.command.as_deref() else {
        anyhow::bail!("missing required option -c/--command");
    };

    let config = Config::load_default()?;
    let ctx = PmashContext::from_cli(&cli, command, &config)?;

    commands::audit::execute(&ctx)
}

/// Installs the stderr log subscriber. `PMASH_LOG` wins over `-V` counts.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(pmash::LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 | 1 => "warn",
            2 => "debug",
            _ => "trace",
        })
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
