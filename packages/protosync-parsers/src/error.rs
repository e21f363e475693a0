use crate::lexer::Position;

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("{0}: unterminated string literal")]
    UnterminatedString(Position),

    #[error("{0}: unterminated block comment")]
    UnterminatedComment(Position),

    #[error("{0}: invalid escape sequence in string literal")]
    InvalidEscape(Position),

    #[error("{0}: expected {1}")]
    Expected(Position, String),

    #[error("{0}: unexpected end of file, unbalanced braces")]
    UnbalancedBraces(Position),
}
