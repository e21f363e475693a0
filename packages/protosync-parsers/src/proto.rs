use crate::{error::Error, lexer::{Lexer, Position, Token}};

#[cfg(test)]
#[path = "./proto.test.rs"]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportModifier {
    Public,
    Weak,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    Syntax(String),
    Package(String),
    Import {
        path: String,
        modifier: Option<ImportModifier>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub statement: Statement,
    pub position: Position,
}

impl Entry {
    pub fn package(&self) -> Option<&str> {
        match &self.statement {
            Statement::Package(package) => Some(package),
            _ => None,
        }
    }

    pub fn import(&self) -> Option<&str> {
        match &self.statement {
            Statement::Import {path, ..} => Some(path),
            _ => None,
        }
    }
}

/// The top-level declarations of a `.proto` file that matter for dependency
/// resolution, in source order. Messages, services, options and the like are
/// skipped without being validated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtoFile {
    pub entries: Vec<Entry>,
}

impl ProtoFile {
    pub fn package(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| entry.package())
    }

    pub fn imports(&self) -> impl Iterator<Item = (&str, Position)> {
        self.entries.iter().filter_map(|entry| {
            entry.import().map(|import| (import, entry.position))
        })
    }
}

pub fn parse(src: &str) -> Result<ProtoFile, Error> {
    Parser::new(src).parse()
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<(Token, Position)>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(src),
            peeked: None,
        }
    }

    fn next(&mut self) -> Result<(Token, Position), Error> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn peek(&mut self) -> Result<&Token, Error> {
        let next
            = self.next()?;

        Ok(&self.peeked.insert(next).0)
    }

    fn parse(mut self) -> Result<ProtoFile, Error> {
        let mut entries = Vec::new();

        loop {
            let (token, position) = self.next()?;

            let statement = match token {
                Token::Eof => break,

                Token::Word(word) if word == "syntax" || word == "edition" => {
                    self.expect_symbol('=')?;
                    Some(Statement::Syntax(self.expect_strings()?))
                },

                Token::Word(word) if word == "package" => {
                    Some(Statement::Package(self.expect_word("a package name")?))
                },

                Token::Word(word) if word == "import" => {
                    let modifier = match self.peek()? {
                        Token::Word(word) if word == "public" => Some(ImportModifier::Public),
                        Token::Word(word) if word == "weak" => Some(ImportModifier::Weak),
                        _ => None,
                    };

                    if modifier.is_some() {
                        self.next()?;
                    }

                    Some(Statement::Import {
                        path: self.expect_strings()?,
                        modifier,
                    })
                },

                Token::Symbol(';') => None,

                token => {
                    self.skip_statement(token, position)?;
                    None
                },
            };

            if let Some(statement) = statement {
                self.expect_symbol(';')?;

                entries.push(Entry {
                    statement,
                    position,
                });
            }
        }

        Ok(ProtoFile {entries})
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), Error> {
        match self.next()? {
            (Token::Symbol(c), _) if c == symbol => Ok(()),
            (_, position) => Err(Error::Expected(position, format!("{:?}", symbol))),
        }
    }

    fn expect_word(&mut self, what: &str) -> Result<String, Error> {
        match self.next()? {
            (Token::Word(word), _) => Ok(word),
            (_, position) => Err(Error::Expected(position, what.to_string())),
        }
    }

    /// One or more adjacent string literals, concatenated.
    fn expect_strings(&mut self) -> Result<String, Error> {
        let mut value = match self.next()? {
            (Token::String(value), _) => value,
            (_, position) => return Err(Error::Expected(position, "a string literal".to_string())),
        };

        while let Token::String(_) = self.peek()? {
            if let (Token::String(more), _) = self.next()? {
                value.push_str(&more);
            }
        }

        Ok(value)
    }

    fn skip_statement(&mut self, first: Token, position: Position) -> Result<(), Error> {
        let mut depth: usize = 0;
        let mut token = first;

        loop {
            match token {
                Token::Eof if depth > 0 => return Err(Error::UnbalancedBraces(position)),
                Token::Eof => return Ok(()),

                Token::Symbol('{') => depth += 1,

                Token::Symbol('}') => {
                    depth = depth.saturating_sub(1);

                    if depth == 0 {
                        return Ok(());
                    }
                },

                Token::Symbol(';') if depth == 0 => return Ok(()),

                _ => {},
            }

            token = self.next()?.0;
        }
    }
}
