//! Core tool traits and types.

use std::collections::HashSet;

use async_trait::async_trait;

use jobsh_types::{ExecResult, JobId};

use super::context::ExecContext;

/// Schema for a tool parameter.
#[derive(Debug, Clone)]
pub struct ParamSchema {
    /// Parameter name.
    pub name: String,
    /// Type hint (string, int, bool).
    pub param_type: String,
    /// Whether this parameter is required.
    pub required: bool,
    /// Description for help text.
    pub description: String,
}

impl ParamSchema {
    /// Create a required parameter.
    pub fn required(name: impl Into<String>, param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            required: true,
            description: description.into(),
        }
    }

    /// Create an optional parameter.
    pub fn optional(name: impl Into<String>, param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            required: false,
            description: description.into(),
        }
    }
}

/// Schema describing a tool's interface.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    /// Tool name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Parameter definitions.
    pub params: Vec<ParamSchema>,
    /// Usage examples as (description, command line).
    pub examples: Vec<(String, String)>,
}

impl ToolSchema {
    /// Create a new tool schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Add a parameter to the schema.
    pub fn param(mut self, param: ParamSchema) -> Self {
        self.params.push(param);
        self
    }

    /// Add a usage example.
    pub fn example(mut self, description: impl Into<String>, command: impl Into<String>) -> Self {
        self.examples.push((description.into(), command.into()));
        self
    }

    /// One-line usage, e.g. `fg [job]`.
    pub fn usage(&self) -> String {
        let mut usage = self.name.clone();
        for param in &self.params {
            if param.required {
                usage.push_str(&format!(" <{}>", param.name));
            } else {
                usage.push_str(&format!(" [{}]", param.name));
            }
        }
        usage
    }
}

/// Parsed arguments ready for tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    /// Positional arguments in order.
    pub positional: Vec<String>,
    /// Boolean flags (e.g. `-l` is stored as `l`).
    pub flags: HashSet<String>,
}

impl ToolArgs {
    /// Create empty args.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a builtin's argument words into flags and positionals.
    ///
    /// `-l` and `--long` become flags; a lone `-` stays positional
    /// (`cd -`), and so does everything after `--`.
    pub fn from_words(words: &[String]) -> Self {
        let mut args = Self::new();
        let mut only_positional = false;
        for word in words {
            if only_positional || word == "-" || !word.starts_with('-') {
                args.positional.push(word.clone());
            } else if word == "--" {
                only_positional = true;
            } else if let Some(long) = word.strip_prefix("--") {
                args.flags.insert(long.to_string());
            } else {
                for c in word[1..].chars() {
                    args.flags.insert(c.to_string());
                }
            }
        }
        args
    }

    /// Get a positional argument by index.
    pub fn get_positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Check if a flag is set.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Parse the optional job argument of `fg`/`bg`.
    ///
    /// `Ok(None)` when absent; a malformed number is an error result
    /// prefixed with the tool name.
    pub fn job_id(&self, tool: &str) -> Result<Option<JobId>, ExecResult> {
        match self.get_positional(0) {
            None => Ok(None),
            Some(word) => word
                .parse::<JobId>()
                .map(Some)
                .map_err(|_| ExecResult::failure(1, format!("{}: {}: invalid job number", tool, word))),
        }
    }
}

/// A tool that can be executed.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's name (used for lookup).
    fn name(&self) -> &str;

    /// Get the tool's schema.
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with the given arguments and context.
    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult;
}
