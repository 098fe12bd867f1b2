/* Declaration-level IDL parser
 *
 * Enum declarations are parsed completely. Every other top-level form is
 * recognized by its keywords and name, and its body is skipped by brace
 * balancing. Extended attributes are outside this grammar and must be
 * removed by a grammar exception beforehand.
 */

use idl_types::{Declaration, DictionaryDecl, EnumDecl, IncludesDecl, InterfaceDecl};
use std::fmt;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("extended attributes are not part of this grammar; add a grammar exception for them")]
    ExtendedAttribute,

    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("unexpected end of input while parsing {context}")]
    UnexpectedEof { context: String },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("unbalanced '{{' opened at line {line}")]
    UnbalancedBrace { line: usize },

    #[error("unknown declaration keyword '{0}'")]
    UnknownDeclaration(String),
}

/* A parse failure with the offending file and position */
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseError {
    pub filename: String,
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: {}", self.filename, self.line, self.column, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Str(String),
    /* Numeric literal, kept verbatim */
    Num(String),
    Punct(char),
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Ident(s) => write!(f, "identifier '{}'", s),
            Tok::Str(s) => write!(f, "string \"{}\"", s),
            Tok::Num(s) => write!(f, "number {}", s),
            Tok::Punct(c) => write!(f, "'{}'", c),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    tok: Tok,
    line: usize,
    column: usize,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    /* Skip whitespace and comments */
    fn skip_trivia(&mut self) -> Result<(), (usize, usize, ParseErrorKind)> {
        loop {
            match (self.peek_char(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    self.eat_while(|c| c != '\n');
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek_char() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => return Err((line, column, ParseErrorKind::UnterminatedComment)),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn tokenize(mut self) -> Result<Vec<Spanned>, (usize, usize, ParseErrorKind)> {
        let mut out = Vec::new();
        loop {
            self.skip_trivia()?;
            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek_char() else {
                return Ok(out);
            };

            let tok = if c.is_ascii_alphabetic() || c == '_' {
                Tok::Ident(self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            } else if c.is_ascii_digit() {
                Tok::Num(self.eat_while(|c| c.is_ascii_alphanumeric() || c == '.'))
            } else if c == '"' {
                self.bump();
                let value = self.eat_while(|c| c != '"');
                if self.bump().is_none() {
                    return Err((line, column, ParseErrorKind::UnterminatedString));
                }
                Tok::Str(value)
            } else if "{}()[]<>;,=:?.-*".contains(c) {
                self.bump();
                Tok::Punct(c)
            } else {
                return Err((line, column, ParseErrorKind::UnexpectedChar(c)));
            };

            out.push(Spanned { tok, line, column });
        }
    }
}

/* Parses IDL documents into one shared, ordered declaration list */
#[derive(Debug, Default)]
pub struct IdlParser {
    declarations: Vec<Declaration>,
}

impl IdlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /* Parse one document and append its declarations */
    pub fn parse(&mut self, text: &str, filename: &str) -> Result<(), ParseError> {
        let tokens = Lexer::new(text)
            .tokenize()
            .map_err(|(line, column, kind)| ParseError {
                filename: filename.to_string(),
                line,
                column,
                kind,
            })?;

        let mut cursor = Cursor {
            tokens,
            pos: 0,
            filename,
        };
        while !cursor.at_end() {
            let decl = cursor.definition()?;
            trace!(kind = decl.kind_str(), name = decl.name(), file = filename, "parsed declaration");
            self.declarations.push(decl);
        }
        Ok(())
    }

    pub fn finish(self) -> Vec<Declaration> {
        self.declarations
    }
}

struct Cursor<'f> {
    tokens: Vec<Spanned>,
    pos: usize,
    filename: &'f str,
}

impl<'f> Cursor<'f> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|s| &s.tok)
    }

    fn peek_ident(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(s)) if s == word)
    }

    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        let (line, column) = match self.tokens.get(self.pos).or(self.tokens.last()) {
            Some(s) => (s.line, s.column),
            None => (1, 1),
        };
        ParseError {
            filename: self.filename.to_string(),
            line,
            column,
            kind,
        }
    }

    fn next(&mut self, context: &str) -> Result<Spanned, ParseError> {
        match self.tokens.get(self.pos) {
            Some(s) => {
                self.pos += 1;
                Ok(s.clone())
            }
            None => Err(self.error_here(ParseErrorKind::UnexpectedEof {
                context: context.to_string(),
            })),
        }
    }

    fn unexpected(&self, expected: &str, found: &Tok) -> ParseError {
        self.error_here(ParseErrorKind::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }

    fn expect_punct(&mut self, c: char, context: &str) -> Result<(), ParseError> {
        let s = self.next(context)?;
        match s.tok {
            Tok::Punct(p) if p == c => Ok(()),
            other => {
                self.pos -= 1;
                Err(self.unexpected(&format!("'{}'", c), &other))
            }
        }
    }

    fn expect_ident(&mut self, context: &str) -> Result<String, ParseError> {
        let s = self.next(context)?;
        match s.tok {
            Tok::Ident(name) => Ok(name),
            other => {
                self.pos -= 1;
                Err(self.unexpected("identifier", &other))
            }
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek() == Some(&Tok::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /* Optional `: Base` inheritance clause */
    fn inheritance(&mut self, context: &str) -> Result<Option<String>, ParseError> {
        if self.eat_punct(':') {
            Ok(Some(self.expect_ident(context)?))
        } else {
            Ok(None)
        }
    }

    /* Skip a `{ ... }` body, nested braces included */
    fn skip_body(&mut self, context: &str) -> Result<(), ParseError> {
        let open_line = self.tokens.get(self.pos).map(|s| s.line).unwrap_or(1);
        self.expect_punct('{', context)?;
        let mut depth = 1usize;
        while depth > 0 {
            let Some(s) = self.tokens.get(self.pos) else {
                return Err(self.error_here(ParseErrorKind::UnbalancedBrace { line: open_line }));
            };
            match s.tok {
                Tok::Punct('{') => depth += 1,
                Tok::Punct('}') => depth -= 1,
                _ => {}
            }
            self.pos += 1;
        }
        Ok(())
    }

    /* Skip to the terminating `;` outside any bracket, returning the last identifier seen */
    fn skip_to_semicolon(&mut self, context: &str) -> Result<Option<String>, ParseError> {
        let mut depth = 0usize;
        let mut last_ident = None;
        loop {
            let s = self.next(context)?;
            match s.tok {
                Tok::Punct('(') | Tok::Punct('<') | Tok::Punct('{') => depth += 1,
                Tok::Punct(')') | Tok::Punct('>') | Tok::Punct('}') => {
                    depth = depth.saturating_sub(1)
                }
                Tok::Punct(';') if depth == 0 => return Ok(last_ident),
                Tok::Ident(name) => last_ident = Some(name),
                _ => {}
            }
        }
    }

    fn definition(&mut self) -> Result<Declaration, ParseError> {
        let s = self.next("a declaration")?;
        let keyword = match s.tok {
            Tok::Ident(word) => word,
            Tok::Punct('[') => {
                self.pos -= 1;
                return Err(self.error_here(ParseErrorKind::ExtendedAttribute));
            }
            other => {
                self.pos -= 1;
                return Err(self.unexpected("a declaration", &other));
            }
        };

        match keyword.as_str() {
            "partial" => {
                let word = self.expect_ident("partial declaration")?;
                match word.as_str() {
                    "interface" => self.interface(true, false),
                    "dictionary" => self.dictionary(true),
                    "namespace" => self.namespace(true),
                    _ => {
                        self.pos -= 1;
                        Err(self.error_here(ParseErrorKind::UnknownDeclaration(format!(
                            "partial {}",
                            word
                        ))))
                    }
                }
            }
            "interface" => self.interface(false, false),
            "callback" => {
                if self.peek_ident("interface") {
                    self.pos += 1;
                    self.interface(false, true)
                } else {
                    let name = self.expect_ident("callback")?;
                    self.expect_punct('=', "callback")?;
                    self.skip_to_semicolon("callback")?;
                    Ok(Declaration::Callback { name })
                }
            }
            "dictionary" => self.dictionary(false),
            "namespace" => self.namespace(false),
            "enum" => self.enumeration(),
            "typedef" => {
                let name = self.skip_to_semicolon("typedef")?;
                match name {
                    Some(name) => Ok(Declaration::Typedef { name }),
                    None => Err(self.error_here(ParseErrorKind::UnexpectedToken {
                        expected: "typedef name".to_string(),
                        found: "';'".to_string(),
                    })),
                }
            }
            _ => {
                if self.peek_ident("includes") {
                    self.pos += 1;
                    let mixin = self.expect_ident("includes statement")?;
                    self.expect_punct(';', "includes statement")?;
                    Ok(Declaration::Includes(IncludesDecl {
                        target: keyword,
                        mixin,
                    }))
                } else {
                    self.pos -= 1;
                    Err(self.error_here(ParseErrorKind::UnknownDeclaration(keyword)))
                }
            }
        }
    }

    fn interface(&mut self, partial: bool, callback: bool) -> Result<Declaration, ParseError> {
        let mixin = !callback && self.peek_ident("mixin");
        if mixin {
            self.pos += 1;
        }
        let name = self.expect_ident("interface")?;
        let inherits = self.inheritance("interface")?;
        self.skip_body("interface")?;
        self.expect_punct(';', "interface")?;
        Ok(Declaration::Interface(InterfaceDecl {
            name,
            inherits,
            partial,
            mixin,
            callback,
        }))
    }

    fn dictionary(&mut self, partial: bool) -> Result<Declaration, ParseError> {
        let name = self.expect_ident("dictionary")?;
        let inherits = self.inheritance("dictionary")?;
        self.skip_body("dictionary")?;
        self.expect_punct(';', "dictionary")?;
        Ok(Declaration::Dictionary(DictionaryDecl {
            name,
            inherits,
            partial,
        }))
    }

    fn namespace(&mut self, partial: bool) -> Result<Declaration, ParseError> {
        let name = self.expect_ident("namespace")?;
        self.skip_body("namespace")?;
        self.expect_punct(';', "namespace")?;
        Ok(Declaration::Namespace { name, partial })
    }

    fn enumeration(&mut self) -> Result<Declaration, ParseError> {
        let name = self.expect_ident("enum")?;
        self.expect_punct('{', "enum")?;

        let mut values = Vec::new();
        loop {
            let s = self.next("enum body")?;
            match s.tok {
                Tok::Str(value) => values.push(value),
                Tok::Punct('}') if values.is_empty() => break,
                other => {
                    self.pos -= 1;
                    return Err(self.unexpected("string literal", &other));
                }
            }

            if self.eat_punct(',') {
                if self.eat_punct('}') {
                    break;
                }
                continue;
            }
            self.expect_punct('}', "enum body")?;
            break;
        }
        self.expect_punct(';', "enum")?;

        Ok(Declaration::Enum(EnumDecl { name, values }))
    }
}
