mod error;
mod grammar;

pub use error::SyntaxError;

use winnow::combinator::terminated;
use winnow::prelude::*;
use winnow::token::take_while;

use crate::types::Expr;

/// Parse formula source text into an [`Expr`] tree.
///
/// # Errors
///
/// Returns the collected syntax diagnostics, each carrying the 1-based line
/// and column of the offending position.
pub fn parse(input: &str) -> Result<Expr, Vec<SyntaxError>> {
    terminated(
        grammar::expression,
        take_while(0.., |c: char| c.is_ascii_whitespace()),
    )
    .parse(input)
    .map_err(|e| {
        let (line, column) = position(input, e.offset());
        let message = e.inner().to_string();
        let message = if message.is_empty() {
            "invalid expression syntax".to_owned()
        } else {
            message
        };
        vec![SyntaxError::new(message, line, column)]
    })
}

/// Translate a byte offset into a 1-based (line, column) pair.
fn position(input: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let before = &input[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |pos| before[pos + 1..].chars().count())
        + 1;
    (line, column)
}
