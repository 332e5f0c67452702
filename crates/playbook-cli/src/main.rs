use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use playbook_cli::{assemble, command, exit_code, vocabulary, AssembleOptions, OutputFormat};
use playbook_core::EnvCredentialSource;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = command().get_matches();

    if let Err(err) = run(&matches) {
        tracing::error!("{:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("assemble", args)) => {
            let scenario = args
                .get_one::<PathBuf>("scenario")
                .cloned()
                .context("missing scenario path")?;
            let options = AssembleOptions {
                scenario,
                config: args.get_one::<PathBuf>("config").cloned(),
                format: OutputFormat::from_json_flag(args.get_flag("json")),
            };

            let playbook = assemble(&options, EnvCredentialSource)?;

            match args.get_one::<PathBuf>("output") {
                Some(path) => {
                    fs::write(path, &playbook)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!("Wrote playbook to {}", path.display());
                }
                None => print!("{playbook}"),
            }
            Ok(())
        }
        Some(("vocabulary", args)) => {
            print!("{}", vocabulary(OutputFormat::from_json_flag(args.get_flag("json")))?);
            Ok(())
        }
        _ => anyhow::bail!("no command given"),
    }
}
