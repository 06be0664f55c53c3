//! Positional message formatting for runtime templates.
//!
//! Templates use `{0}`, `{1}`, ... placeholders referring to the argument list;
//! `{{` and `}}` produce literal braces. A placeholder without a matching
//! argument is an error rather than being left in the output.

use std::fmt::{Display, Write};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unclosed placeholder starting at byte {position}")]
    UnclosedPlaceholder { position: usize },

    #[error("unexpected '}}' at byte {position}")]
    UnexpectedClosingBrace { position: usize },

    #[error("invalid placeholder {text:?} at byte {position}")]
    InvalidIndex { position: usize, text: String },

    #[error("placeholder {{{index}}} has no argument ({count} supplied)")]
    IndexOutOfRange { index: usize, count: usize },
}

/// Substitute positional placeholders in `template` with `args`.
pub fn format_positional(template: &str, args: &[&dyn Display]) -> Result<String, FormatError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    output.push('{');
                    continue;
                }

                let mut text = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    text.push(c);
                }
                if !closed {
                    return Err(FormatError::UnclosedPlaceholder { position });
                }

                let index: usize = text
                    .trim()
                    .parse()
                    .map_err(|_| FormatError::InvalidIndex { position, text })?;
                let arg = args.get(index).ok_or(FormatError::IndexOutOfRange {
                    index,
                    count: args.len(),
                })?;
                // Writing to a String cannot fail
                let _ = write!(output, "{arg}");
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    output.push('}');
                } else {
                    return Err(FormatError::UnexpectedClosingBrace { position });
                }
            }
            c => output.push(c),
        }
    }

    Ok(output)
}
