mod cli;

use cli::{CliConfig, CliError};
use spotkeep_core::{print_summary, run, write_json, RunConfig};
use std::fs::OpenOptions;
use std::process;

fn main() {
    let config = CliConfig::from_env().unwrap_or_else(|err| match err {
        CliError::Help | CliError::Version => {
            println!("{}", err);
            process::exit(0);
        }
        _ => {
            eprintln!("{}", err);
            process::exit(1);
        }
    });

    if let Err(error) = init_logging(&config) {
        eprintln!("could not open log file: {}", error);
        process::exit(1);
    }

    let run_config = RunConfig::new(config.source.clone(), config.target.clone())
        .with_policy(config.policy.clone())
        .with_threading(config.threading)
        .with_resolve_mode(config.resolve_mode)
        .with_duplicate_removal(config.remove_duplicates)
        .with_invalid_purge(config.purge_invalid)
        .with_progress(!config.quiet);

    match run(&run_config) {
        Ok(report) => {
            if !config.quiet {
                print_summary(&report);
            }
            if let Some(path) = &config.report {
                match write_json(&report, path) {
                    Ok(()) => println!("JSON report written to {}", path.display()),
                    Err(error) => eprintln!("Error writing JSON report: {}", error),
                }
            }
        }
        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    }
}

fn init_logging(config: &CliConfig) -> Result<(), std::io::Error> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.target(env_logger::Target::Stderr);
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}
