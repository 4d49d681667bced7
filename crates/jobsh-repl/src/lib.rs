//! jobsh REPL: the interactive front end.
//!
//! The kernel only ever sees parsed commands; everything about reading a
//! line lives here:
//! - Alias substitution and the `alias`/`unalias`/`help`/`exit` commands
//! - Parsing a line into a [`Command`](jobsh_types::Command)
//! - Printing results and, once per cycle, completion notices
//! - Line editing and history via rustyline

pub mod alias;
pub mod parser;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::runtime::Runtime;

use jobsh_kernel::{ExecResult, Shell, ShellConfig, paths};

use crate::alias::AliasTable;

/// What the loop should do after a line.
#[derive(Debug)]
pub enum Step {
    /// Keep reading. Print the result, if there is one.
    Continue(Option<ExecResult>),
    /// Leave the loop.
    Exit,
}

/// REPL state: the shell, its runtime and the alias table.
pub struct Repl {
    // Declared before the runtime so its tasks are aborted first
    shell: Shell,
    aliases: AliasTable,
    runtime: Runtime,
}

impl Repl {
    /// Create a REPL with a shell built from `config`.
    pub fn with_config(config: ShellConfig) -> Result<Self> {
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        let shell = {
            let _guard = runtime.enter();
            Shell::new(config).context("Failed to start shell")?
        };
        Ok(Self {
            shell,
            aliases: AliasTable::new(),
            runtime,
        })
    }

    /// The shell this REPL drives.
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Process a single line of input.
    ///
    /// Returns `Err` only when the shell cannot go on (process creation is
    /// impossible); parse errors and failed commands are results.
    pub fn process_line(&mut self, line: &str) -> Result<Step> {
        let expanded = self.aliases.expand(line).into_owned();
        let command = match parser::parse(&expanded) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Step::Continue(None)),
            Err(e) => return Ok(Step::Continue(Some(ExecResult::failure(2, format!("jobsh: {}", e))))),
        };

        match command.program().unwrap_or_default() {
            "exit" | "quit" => return Ok(Step::Exit),
            "help" => return Ok(Step::Continue(Some(ExecResult::success(self.help_text())))),
            "alias" => return Ok(Step::Continue(Some(self.alias(command.args())))),
            "unalias" => return Ok(Step::Continue(Some(self.unalias(command.args())))),
            _ => {}
        }

        let result = self
            .runtime
            .block_on(self.shell.execute(&command))
            .context("shell cannot continue")?;
        Ok(Step::Continue(Some(result)))
    }

    /// Completion notices for jobs that finished since the last call.
    pub fn drain_notices(&self) -> Vec<String> {
        self.runtime.block_on(self.shell.notify_completed())
    }

    /// Interrupt every remaining job.
    pub fn shutdown(&self) {
        self.runtime.block_on(self.shell.shutdown());
    }

    fn alias(&mut self, args: &[String]) -> ExecResult {
        if args.is_empty() {
            return ExecResult::success(self.aliases.listing());
        }
        let mut out = String::new();
        for arg in args {
            match arg.split_once('=') {
                Some((name, value)) => {
                    if let Err(e) = self.aliases.set(name, value) {
                        return ExecResult::failure(1, format!("alias: {}", e));
                    }
                }
                None => match self.aliases.get(arg) {
                    Some(value) => out.push_str(&format!("alias {}='{}'\n", arg, value)),
                    None => return ExecResult::failure(1, format!("alias: {}: not found", arg)),
                },
            }
        }
        ExecResult::success(out)
    }

    fn unalias(&mut self, args: &[String]) -> ExecResult {
        if args.is_empty() {
            return ExecResult::failure(2, "unalias: usage: unalias name [name ...]");
        }
        for name in args {
            if !self.aliases.remove(name) {
                return ExecResult::failure(1, format!("unalias: {}: not found", name));
            }
        }
        ExecResult::default()
    }

    fn help_text(&self) -> String {
        let mut text = String::from(HELP_TEXT);
        text.push_str("\nJob control builtins:\n");
        for schema in self.shell.tool_schemas() {
            text.push_str(&format!("  {:<22}{}\n", schema.usage(), schema.description));
        }
        text
    }
}

/// Print a result: `out` as-is on stdout, `err` as a line on stderr.
pub fn emit(result: &ExecResult) {
    if !result.out.is_empty() {
        print!("{}", result.out);
        let _ = std::io::stdout().flush();
    }
    if !result.err.is_empty() {
        eprintln!("{}", result.err);
    }
}

fn print_notices(repl: &Repl) {
    for notice in repl.drain_notices() {
        println!("{}", notice);
    }
}

fn save_history(rl: &mut Editor<(), DefaultHistory>, path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        tracing::warn!("Failed to create history directory: {}", e);
    }
    if let Err(e) = rl.save_history(path) {
        tracing::warn!("Failed to save history: {}", e);
    }
}

/// Run the interactive loop until `exit` or end of input.
pub fn run(config: ShellConfig, quiet: bool) -> Result<()> {
    if !quiet {
        println!("jobsh v{}", env!("CARGO_PKG_VERSION"));
        println!("Type help for commands, exit to quit.");
    }

    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let history_path = paths::history_file();
    if let Err(e) = rl.load_history(&history_path) {
        // Expected on first run
        let is_not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound);
        if !is_not_found {
            tracing::warn!("Failed to load history: {}", e);
        }
    }

    let mut repl = Repl::with_config(config)?;

    loop {
        match rl.readline("jobsh> ") {
            Ok(line) => {
                if !line.trim().is_empty()
                    && let Err(e) = rl.add_history_entry(line.as_str())
                {
                    tracing::warn!("Failed to add history entry: {}", e);
                }

                match repl.process_line(&line) {
                    Ok(Step::Continue(Some(result))) => emit(&result),
                    Ok(Step::Continue(None)) => {}
                    Ok(Step::Exit) => break,
                    Err(e) => {
                        eprintln!("jobsh: {:#}", e);
                        repl.shutdown();
                        save_history(&mut rl, &history_path);
                        return Err(e);
                    }
                }
                print_notices(&repl);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("exit");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    repl.shutdown();
    save_history(&mut rl, &history_path);
    Ok(())
}

/// Run one line non-interactively and return its exit code.
pub fn run_command(line: &str, config: ShellConfig) -> Result<i64> {
    let mut repl = Repl::with_config(config)?;
    let outcome = repl.process_line(line);
    let code = match &outcome {
        Ok(Step::Continue(Some(result))) => {
            emit(result);
            result.code
        }
        Ok(_) => 0,
        Err(_) => 1,
    };
    print_notices(&repl);
    repl.shutdown();
    outcome.map(|_| code)
}

const HELP_TEXT: &str = r#"jobsh: a small job-control shell

Commands:
  help                  Show this help
  exit, quit            Leave the shell (remaining jobs are interrupted)
  alias [name=value]    Define or list aliases
  unalias name          Remove an alias

Syntax:
  cmd args...           Run a program found in PATH (or by path)
  cmd < in > out        Redirect standard input / output
  cmd &                 Run in the background
  'a b' "a b" a\ b      Quoting

Keys:
  Ctrl-C                Interrupt the foreground job
  Ctrl-Z                Stop the foreground job (resume with fg or bg)
"#;
