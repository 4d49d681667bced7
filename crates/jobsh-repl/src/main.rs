//! jobsh CLI entry point.
//!
//! Usage:
//!   jobsh                      # Interactive REPL
//!   jobsh -c <command>         # Execute command and exit

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use jobsh_kernel::ShellConfig;

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

/// Options shared by the interactive and `-c` modes.
#[derive(Debug, Default)]
struct Options {
    notify: bool,
    report_unknown_jobs: bool,
    quiet: bool,
    command: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(None);
            }
            "--version" | "-V" => {
                println!(
                    "jobsh {} ({} {})",
                    env!("CARGO_PKG_VERSION"),
                    env!("JOBSH_GIT_HASH"),
                    env!("JOBSH_BUILD_DATE")
                );
                return Ok(None);
            }
            "--notify" | "-b" => options.notify = true,
            "--report-unknown-jobs" => options.report_unknown_jobs = true,
            "--quiet" | "-q" => options.quiet = true,
            "-c" => {
                let command = iter.next().context("-c requires a command argument")?;
                options.command = Some(command.clone());
            }
            unknown => anyhow::bail!("unknown option: {unknown} (run 'jobsh --help' for usage)"),
        }
    }
    Ok(Some(options))
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(options) = parse_args(&args)? else {
        return Ok(ExitCode::SUCCESS);
    };

    match options.command {
        Some(ref line) => {
            let config = ShellConfig::transient()
                .with_name("command")
                .with_job_control(true)
                .with_notify_immediately(options.notify)
                .with_report_unknown_jobs(options.report_unknown_jobs);
            let code = jobsh_repl::run_command(line, config)?;
            Ok(ExitCode::from(code.clamp(0, 255) as u8))
        }
        None => {
            let config = ShellConfig::interactive()
                .with_announce_background(!options.quiet)
                .with_notify_immediately(options.notify)
                .with_report_unknown_jobs(options.report_unknown_jobs);
            jobsh_repl::run(config, options.quiet)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_help() {
    println!(
        r#"jobsh v{}

Usage:
  jobsh [OPTIONS]              Interactive shell
  jobsh [OPTIONS] -c <command> Execute one command and exit

Options:
  -c <command>                 Execute command string and exit
  -b, --notify                 Report finished jobs as soon as they end
      --report-unknown-jobs    Make fg/bg fail on an unknown job number
  -q, --quiet                  No banner, no [n] pid on background start
  -h, --help                   Show this help
  -V, --version                Show version

Logging:
  RUST_LOG=jobsh_kernel=debug  Trace spawns, reaping and job transitions
"#,
        env!("CARGO_PKG_VERSION")
    );
}
