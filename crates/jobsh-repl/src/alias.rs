//! Alias table: first-word text substitution before parsing.

use std::borrow::Cow;

use thiserror::Error;

/// Most aliases a session may define.
pub const MAX_ALIASES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    #[error("alias table is full ({MAX_ALIASES} entries)")]
    Full,

    #[error("{0}: invalid alias name")]
    InvalidName(String),
}

/// Name to replacement text, in definition order.
#[derive(Debug, Default)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or redefine an alias. Redefining never counts against the cap.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), AliasError> {
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || "=<>&|'\"\\".contains(c)) {
            return Err(AliasError::InvalidName(name.to_string()));
        }
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_string();
            return Ok(());
        }
        if self.entries.len() >= MAX_ALIASES {
            return Err(AliasError::Full);
        }
        self.entries.push((name.to_string(), value.to_string()));
        Ok(())
    }

    /// Remove an alias. False if it was not defined.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        self.entries.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the first word of `line` if it names an alias.
    ///
    /// One level only: the replacement is not expanded again, so an alias
    /// may safely refer to a command of the same name (`alias ls='ls -F'`).
    pub fn expand<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let trimmed = line.trim_start();
        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let (first, rest) = trimmed.split_at(end);
        match self.get(first) {
            Some(value) => Cow::Owned(format!("{}{}", value, rest)),
            None => Cow::Borrowed(line),
        }
    }

    /// `alias` listing, one `alias name='value'` per line.
    pub fn listing(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| format!("alias {}='{}'\n", name, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_only_the_first_word() {
        let mut table = AliasTable::new();
        table.set("ll", "ls -l").unwrap();
        assert_eq!(table.expand("ll /tmp"), "ls -l /tmp");
        assert_eq!(table.expand("echo ll"), "echo ll");
        assert!(matches!(table.expand("echo ll"), Cow::Borrowed(_)));
    }

    #[test]
    fn expansion_is_not_recursive() {
        let mut table = AliasTable::new();
        table.set("ls", "ls -F").unwrap();
        assert_eq!(table.expand("ls"), "ls -F");
    }

    #[test]
    fn redefine_and_remove() {
        let mut table = AliasTable::new();
        table.set("g", "git").unwrap();
        table.set("g", "git status").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("g"), Some("git status"));
        assert!(table.remove("g"));
        assert!(!table.remove("g"));
        assert!(table.is_empty());
    }

    #[test]
    fn capacity_is_bounded() {
        let mut table = AliasTable::new();
        for i in 0..MAX_ALIASES {
            table.set(&format!("a{i}"), "true").unwrap();
        }
        assert_eq!(table.set("one-more", "true"), Err(AliasError::Full));
        // Redefinition still works when full
        assert!(table.set("a0", "false").is_ok());
    }

    #[test]
    fn rejects_bad_names() {
        let mut table = AliasTable::new();
        assert!(matches!(table.set("", "x"), Err(AliasError::InvalidName(_))));
        assert!(matches!(table.set("a b", "x"), Err(AliasError::InvalidName(_))));
        assert!(matches!(table.set("a>b", "x"), Err(AliasError::InvalidName(_))));
    }

    #[test]
    fn listing_in_definition_order() {
        let mut table = AliasTable::new();
        table.set("z", "zip").unwrap();
        table.set("a", "awk").unwrap();
        assert_eq!(table.listing(), "alias z='zip'\nalias a='awk'\n");
    }
}
