//! Lexer and parser for the menu configuration language.
//!
//! ```text
//! config  := menu?
//! menu    := "menu" NEWLINE item (NEWLINE item)* NEWLINE "end"
//! item    := "exec" STRING STRING | "exit" | "reload" | /*empty*/
//! ```
//!
//! `#` starts a comment that runs to the end of the line. Blank lines may
//! surround the menu. The first error aborts parsing; there is no recovery.

use std::fmt;

use crate::menu::{Config, Menu, MenuItem};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: unterminated string")]
    UnterminatedString { line: usize },

    #[error("line {line}: unknown escape sequence \\{ch}")]
    UnknownEscape { line: usize, ch: char },

    #[error("line {line}: NUL character in string")]
    NulInString { line: usize },

    #[error("line {line}: unexpected character {ch:?}")]
    UnexpectedChar { line: usize, ch: char },

    #[error("line {line}: unknown keyword \"{word}\"")]
    UnknownKeyword { line: usize, word: String },

    #[error("line {line}: expected {expected}, found {found}")]
    Unexpected {
        line: usize,
        expected: &'static str,
        found: Token,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Menu,
    End,
    Exec,
    Exit,
    Reload,
    Str(String),
    Newline,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Menu => f.write_str("\"menu\""),
            Self::End => f.write_str("\"end\""),
            Self::Exec => f.write_str("\"exec\""),
            Self::Exit => f.write_str("\"exit\""),
            Self::Reload => f.write_str("\"reload\""),
            Self::Str(s) => write!(f, "string {s:?}"),
            Self::Newline => f.write_str("newline"),
            Self::Eof => f.write_str("end of file"),
        }
    }
}

/// Splits source text into tokens, tracking line numbers.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
        }
    }

    /// Line of the most recently returned token.
    pub const fn line(&self) -> usize {
        self.line
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            match self.chars.peek().copied() {
                None => return Ok(Token::Eof),
                Some(' ' | '\t' | '\r') => {
                    self.chars.next();
                }
                Some('#') => {
                    while self.chars.next_if(|&c| c != '\n').is_some() {}
                }
                Some('\n') => {
                    self.chars.next();
                    self.line += 1;
                    return Ok(Token::Newline);
                }
                Some('"') => {
                    self.chars.next();
                    return self.string();
                }
                Some(c) if c.is_ascii_alphabetic() => return self.keyword(),
                Some(ch) => {
                    return Err(ParseError::UnexpectedChar {
                        line: self.line,
                        ch,
                    })
                }
            }
        }
    }

    fn keyword(&mut self) -> Result<Token, ParseError> {
        let mut word = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
            word.push(c);
        }
        match word.as_str() {
            "menu" => Ok(Token::Menu),
            "end" => Ok(Token::End),
            "exec" => Ok(Token::Exec),
            "exit" => Ok(Token::Exit),
            "reload" => Ok(Token::Reload),
            _ => Err(ParseError::UnknownKeyword {
                line: self.line,
                word,
            }),
        }
    }

    fn string(&mut self) -> Result<Token, ParseError> {
        let line = self.line;
        let mut value = String::new();
        loop {
            match self.chars.next() {
                None | Some('\n') => return Err(ParseError::UnterminatedString { line }),
                Some('"') => return Ok(Token::Str(value)),
                Some('\0') => return Err(ParseError::NulInString { line }),
                Some('\\') => match self.chars.next() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(ch) => return Err(ParseError::UnknownEscape { line, ch }),
                    None => return Err(ParseError::UnterminatedString { line }),
                },
                Some(c) => value.push(c),
            }
        }
    }
}

/// Recursive-descent parser over a [`Lexer`] with one token of lookahead.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        // A newline token has already bumped the line counter.
        let line = match self.current {
            Token::Newline => self.lexer.line() - 1,
            _ => self.lexer.line(),
        };
        ParseError::Unexpected {
            line,
            expected,
            found: self.current.clone(),
        }
    }

    fn skip_newlines(&mut self) -> Result<(), ParseError> {
        while self.current == Token::Newline {
            self.advance()?;
        }
        Ok(())
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        if matches!(self.current, Token::Str(_)) {
            if let Token::Str(s) = self.advance()? {
                return Ok(s);
            }
        }
        Err(self.unexpected("a string"))
    }

    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        if self.current == Token::Newline {
            self.advance()?;
            return Ok(());
        }
        Err(self.unexpected("newline"))
    }

    pub fn parse_config(mut self) -> Result<Config, ParseError> {
        self.skip_newlines()?;
        let menu = match self.current {
            Token::Menu => Some(self.parse_menu()?),
            Token::Eof => None,
            _ => return Err(self.unexpected("\"menu\"")),
        };
        self.skip_newlines()?;
        if self.current != Token::Eof {
            return Err(self.unexpected("end of file"));
        }
        Ok(Config { menu })
    }

    fn parse_menu(&mut self) -> Result<Menu, ParseError> {
        self.advance()?;
        self.expect_line_end()?;
        let mut items = Vec::new();
        loop {
            match self.current {
                Token::Newline => {
                    self.advance()?;
                }
                Token::End => {
                    self.advance()?;
                    return Ok(Menu { items });
                }
                Token::Exec => {
                    self.advance()?;
                    let caption = self.expect_string()?;
                    let command = self.expect_string()?;
                    items.push(MenuItem::Exec { caption, command });
                    self.expect_line_end()?;
                }
                Token::Exit => {
                    self.advance()?;
                    items.push(MenuItem::Exit);
                    self.expect_line_end()?;
                }
                Token::Reload => {
                    self.advance()?;
                    items.push(MenuItem::Reload);
                    self.expect_line_end()?;
                }
                _ => return Err(self.unexpected("a menu item or \"end\"")),
            }
        }
    }
}

/// Parse a whole configuration source.
pub fn parse(source: &str) -> Result<Config, ParseError> {
    Parser::new(source)?.parse_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_sample_menu() {
        let source = "menu\n  exec \"Firefox\" \"firefox\"\n  exec \"mlterm\" \"mlterm\"\n  exit\nend\n";
        let config = parse(source).unwrap();
        assert_eq!(
            config,
            Config {
                menu: Some(Menu {
                    items: vec![
                        MenuItem::exec("Firefox", "firefox"),
                        MenuItem::exec("mlterm", "mlterm"),
                        MenuItem::Exit,
                    ],
                }),
            }
        );
    }

    #[test]
    fn test_empty_source_has_no_menu() {
        assert_eq!(parse("").unwrap(), Config::default());
        assert_eq!(parse("\n# nothing here\n\n").unwrap(), Config::default());
    }

    #[test]
    fn test_comments_and_blank_items() {
        let source = "# launcher\nmenu # top\n\n  exec \"a\" \"b\" # run b\n\n  reload\nend";
        let config = parse(source).unwrap();
        let items = config.menu.unwrap().items;
        assert_eq!(items, vec![MenuItem::exec("a", "b"), MenuItem::Reload]);
    }

    #[test]
    fn test_escapes() {
        let config = parse("menu\nexec \"say \\\"hi\\\"\" \"echo a\\\\b\\tc\\n\"\nend\n").unwrap();
        assert_eq!(
            config.menu.unwrap().items,
            vec![MenuItem::exec("say \"hi\"", "echo a\\b\tc\n")]
        );
    }

    #[test]
    fn test_unknown_escape_is_rejected() {
        let err = parse("menu\nexec \"a\\q\" \"b\"\nend\n").unwrap_err();
        assert_eq!(err, ParseError::UnknownEscape { line: 2, ch: 'q' });
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse("menu\nexec \"abc\nend\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedString { line: 2 });
    }

    #[test]
    fn test_unknown_keyword_reports_line() {
        let err = parse("menu\n\n  launch \"x\"\nend\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownKeyword {
                line: 3,
                word: "launch".into()
            }
        );
        assert_eq!(err.to_string(), "line 3: unknown keyword \"launch\"");
    }

    #[test]
    fn test_missing_end() {
        let err = parse("menu\nexit\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Unexpected {
                found: Token::Eof,
                ..
            }
        ));
    }

    #[test]
    fn test_exec_needs_two_strings() {
        let err = parse("menu\nexec \"only\"\nend\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::Unexpected {
                line: 2,
                expected: "a string",
                found: Token::Newline,
            }
        );
    }

    #[test]
    fn test_trailing_garbage_after_end() {
        let err = parse("menu\nend\nexit\n").unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { line: 3, .. }));
    }

    #[test]
    fn test_unexpected_character() {
        let err = parse("menu\n  @\nend\n").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedChar { line: 2, ch: '@' });
    }
}
