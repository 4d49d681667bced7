//! Line parser: one input line to one [`Command`].
//!
//! Words are split on whitespace. Single quotes keep everything literal,
//! double quotes keep everything but `\"` and `\\`, and a backslash outside
//! quotes escapes the next character. `<`, `>` and `&` are operators
//! wherever they appear unquoted, so `echo hi>out.txt` works.

use thiserror::Error;

use jobsh_types::Command;

/// Why a line could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("syntax error: '{0}' needs a file name")]
    MissingTarget(char),

    #[error("syntax error: '&' is only allowed at the end of a command")]
    MisplacedBackground,

    #[error("pipelines are not supported")]
    Pipeline,

    #[error("syntax error: redirection without a command")]
    MissingCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Input,
    Output,
    Background,
    Pipe,
}

fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    // A word may be an empty quoted string, so track "started" separately
    let mut in_word = false;
    let mut chars = line.chars().peekable();

    let flush = |tokens: &mut Vec<Token>, word: &mut String, in_word: &mut bool| {
        if *in_word {
            tokens.push(Token::Word(std::mem::take(word)));
            *in_word = false;
        }
    };

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => flush(&mut tokens, &mut word, &mut in_word),
            '<' | '>' | '&' | '|' => {
                flush(&mut tokens, &mut word, &mut in_word);
                tokens.push(match c {
                    '<' => Token::Input,
                    '>' => Token::Output,
                    '&' => Token::Background,
                    _ => Token::Pipe,
                });
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err(ParseError::UnterminatedQuote('\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') if matches!(chars.peek(), Some('"' | '\\')) => {
                            if let Some(escaped) = chars.next() {
                                word.push(escaped);
                            }
                        }
                        Some(c) => word.push(c),
                        None => return Err(ParseError::UnterminatedQuote('"')),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                }
            }
            c => {
                in_word = true;
                word.push(c);
            }
        }
    }
    flush(&mut tokens, &mut word, &mut in_word);
    Ok(tokens)
}

/// Parse one line.
///
/// Returns `Ok(None)` for a blank line. The command's display text is the
/// trimmed line as typed.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut command = Command::default();
    let mut tokens = tokens.into_iter().peekable();
    while let Some(token) = tokens.next() {
        match token {
            Token::Word(word) => command.argv.push(word),
            Token::Input => match tokens.next() {
                Some(Token::Word(path)) => command.input = Some(path.into()),
                _ => return Err(ParseError::MissingTarget('<')),
            },
            Token::Output => match tokens.next() {
                Some(Token::Word(path)) => command.output = Some(path.into()),
                _ => return Err(ParseError::MissingTarget('>')),
            },
            Token::Background => {
                if tokens.peek().is_some() {
                    return Err(ParseError::MisplacedBackground);
                }
                command.background = true;
            }
            Token::Pipe => return Err(ParseError::Pipeline),
        }
    }

    if command.argv.is_empty() {
        return Err(ParseError::MissingCommand);
    }
    command.text = line.trim().to_string();
    Ok(Some(command))
}
