//! The parsed command handed from the line parser to the kernel.

use std::path::PathBuf;

/// One simple command, fully parsed: argument vector, redirections and the
/// background flag.
///
/// The kernel owns a `Command` for the duration of a single launch. The
/// display text is copied into the job record, so nothing in the job table
/// borrows from it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    /// Program name followed by its arguments.
    pub argv: Vec<String>,
    /// Rebind the child's standard input to this file.
    pub input: Option<PathBuf>,
    /// Rebind the child's standard output to this file (created or truncated).
    pub output: Option<PathBuf>,
    /// Run without waiting (`&`).
    pub background: bool,
    /// The command line as the user typed it, used for `jobs` and notices.
    pub text: String,
}

impl Command {
    /// Create a foreground command from an argument vector.
    ///
    /// The display text defaults to the arguments joined by spaces.
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let text = argv.join(" ");
        Self {
            argv,
            input: None,
            output: None,
            background: false,
            text,
        }
    }

    /// Redirect standard input from `path`.
    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Redirect standard output to `path`.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Mark the command to run in the background.
    pub fn in_background(mut self) -> Self {
        self.background = true;
        self
    }

    /// Replace the display text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// The program name (`argv[0]`), if any.
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }

    /// True when there is nothing to run.
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}
