use std::{fmt::{self, Display, Formatter}, iter::Peekable, str::Chars};

use crate::error::Error;

/// One-based line and column of a token in the source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Identifiers, dotted names and numeric literals; the grammar parts we
    /// care about never need to tell them apart.
    Word(String),
    String(String),
    Symbol(char),
    Eof,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            chars: src.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;

        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(c)
    }

    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                },

                Some('/') => {
                    let start = self.position();

                    let mut lookahead = self.chars.clone();
                    lookahead.next();

                    match lookahead.peek() {
                        Some('/') => {
                            while let Some(c) = self.bump() {
                                if c == '\n' {
                                    break;
                                }
                            }
                        },

                        Some('*') => {
                            self.bump();
                            self.bump();

                            let mut previous = '\0';
                            loop {
                                match self.bump() {
                                    Some('/') if previous == '*' => break,
                                    Some(c) => previous = c,
                                    None => return Err(Error::UnterminatedComment(start)),
                                }
                            }
                        },

                        _ => return Ok(()),
                    }
                },

                _ => return Ok(()),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<(Token, Position), Error> {
        self.skip_trivia()?;

        let position = self.position();

        let Some(&c) = self.chars.peek() else {
            return Ok((Token::Eof, position));
        };

        let token = if c == '"' || c == '\'' {
            self.bump();
            Token::String(self.read_string(c, position)?)
        } else if c.is_alphanumeric() || c == '_' || c == '.' {
            let mut word = String::new();

            while let Some(&c) = self.chars.peek() {
                if !(c.is_alphanumeric() || c == '_' || c == '.') {
                    break;
                }

                word.push(c);
                self.bump();
            }

            Token::Word(word)
        } else {
            self.bump();
            Token::Symbol(c)
        };

        Ok((token, position))
    }

    fn read_string(&mut self, quote: char, start: Position) -> Result<String, Error> {
        let mut value = String::new();

        loop {
            let escape_position = self.position();

            match self.bump() {
                None | Some('\n') => return Err(Error::UnterminatedString(start)),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => value.push(self.read_escape(escape_position)?),
                Some(c) => value.push(c),
            }
        }
    }

    fn read_escape(&mut self, position: Position) -> Result<char, Error> {
        let c = self.bump()
            .ok_or(Error::InvalidEscape(position))?;

        let escaped = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'v' => '\x0b',
            '\\' | '\'' | '"' | '?' => c,

            'x' | 'X' => {
                let digits = self.take_digits(16, 2);
                let value = u32::from_str_radix(&digits, 16)
                    .map_err(|_| Error::InvalidEscape(position))?;

                char::from_u32(value).ok_or(Error::InvalidEscape(position))?
            },

            '0'..='7' => {
                let mut digits = c.to_string();
                digits.push_str(&self.take_digits(8, 2));

                let value = u32::from_str_radix(&digits, 8)
                    .map_err(|_| Error::InvalidEscape(position))?;

                char::from_u32(value).ok_or(Error::InvalidEscape(position))?
            },

            _ => return Err(Error::InvalidEscape(position)),
        };

        Ok(escaped)
    }

    fn take_digits(&mut self, radix: u32, max: usize) -> String {
        let mut digits = String::new();

        while digits.len() < max {
            match self.chars.peek() {
                Some(c) if c.is_digit(radix) => {
                    digits.push(*c);
                    self.bump();
                },

                _ => break,
            }
        }

        digits
    }
}
