use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ThriftError;
use crate::utils::quote;

lazy_static! {
    pub static ref TOKEN_REGEX: Regex = Regex::new(
        r##"(/\*(?:[^*]|\*+[^*/])*\*+/|//[^\n]*|#[^\n]*|"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|-?\d+\.\d*(?:[eE][+-]?\d+)?|[+-]?\d+|[A-Za-z_][A-Za-z0-9_.]*|[{}()<>\[\],;:=*]|\s+)"##
    ).unwrap();
    static ref WHITESPACE_RX: Regex = Regex::new(r"^\s+$").unwrap();
    static ref INT_RX:        Regex = Regex::new(r"^[+-]?\d+$").unwrap();
    static ref DOUBLE_RX:     Regex = Regex::new(r"^-?\d+\.\d*(?:[eE][+-]?\d+)?$").unwrap();
    static ref IDENT_RX:      Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Include,
    Namespace,
    Const,
    Typedef,
    Enum,
    Struct,
    Union,
    Exception,
    Service,
    Extends,
    Oneway,
    Throws,
    Required,
    Optional,
    Void,
    Map,
    List,
    Set,
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
}

impl Keyword {
    fn from_str(text: &str) -> Option<Keyword> {
        Some(match text {
            "include" => Keyword::Include,
            "namespace" => Keyword::Namespace,
            "const" => Keyword::Const,
            "typedef" => Keyword::Typedef,
            "enum" => Keyword::Enum,
            "struct" => Keyword::Struct,
            "union" => Keyword::Union,
            "exception" => Keyword::Exception,
            "service" => Keyword::Service,
            "extends" => Keyword::Extends,
            "oneway" => Keyword::Oneway,
            "throws" => Keyword::Throws,
            "required" => Keyword::Required,
            "optional" => Keyword::Optional,
            "void" => Keyword::Void,
            "map" => Keyword::Map,
            "list" => Keyword::List,
            "set" => Keyword::Set,
            "bool" => Keyword::Bool,
            "byte" => Keyword::Byte,
            "i16" => Keyword::I16,
            "i32" => Keyword::I32,
            "i64" => Keyword::I64,
            "double" => Keyword::Double,
            "string" => Keyword::String,
            "binary" => Keyword::Binary,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Kw(Keyword),
    Ident(String),
    Int(i64),
    Double(f64),
    Str(String),
    Bool(bool),
    Punct(char),
    Eof,
}

impl TokenKind {
    /// How this token reads in a grammar error message.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Kw(kw) => format!("keyword {:?}", format!("{:?}", kw).to_lowercase()),
            TokenKind::Ident(name) => format!("identifier {}", quote(name)),
            TokenKind::Int(v) => v.to_string(),
            TokenKind::Double(v) => v.to_string(),
            TokenKind::Str(s) => quote(s),
            TokenKind::Bool(b) => b.to_string(),
            TokenKind::Punct(c) => format!("{:?}", c),
            TokenKind::Eof => "end of file".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

/// Split IDL source into classified tokens, tracking line and column.
/// Comments and whitespace are consumed here; an EOF token is appended.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ThriftError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        let start = mat.start();
        let end = mat.end();
        let part = mat.as_str();

        if start > last_end {
            let unexpected = &text[last_end..start];
            return Err(ThriftError::Lexical {
                msg: format!("unexpected input {}", quote(unexpected)),
                line,
                column,
            });
        }

        if let Some(kind) = classify(part, line, column)? {
            tokens.push(Token { kind, line, column });
        }

        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                column = last_line_part.len() + 1;
            }
        } else {
            column += part.len();
        }

        last_end = end;
    }

    if last_end != text.len() {
        let unexpected = &text[last_end..];
        return Err(ThriftError::Lexical {
            msg: format!("unexpected input {}", quote(unexpected)),
            line,
            column,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line,
        column,
    });
    Ok(tokens)
}

fn classify(part: &str, line: usize, column: usize) -> Result<Option<TokenKind>, ThriftError> {
    if WHITESPACE_RX.is_match(part)
        || part.starts_with("//")
        || part.starts_with('#')
        || part.starts_with("/*")
    {
        return Ok(None);
    }

    if part.starts_with('"') || part.starts_with('\'') {
        let inner = &part[1..part.len() - 1];
        return Ok(Some(TokenKind::Str(unescape(inner, line, column)?)));
    }

    if INT_RX.is_match(part) {
        let value = part.parse::<i64>().map_err(|_| ThriftError::Lexical {
            msg: format!("integer literal {} out of range", quote(part)),
            line,
            column,
        })?;
        return Ok(Some(TokenKind::Int(value)));
    }

    if DOUBLE_RX.is_match(part) {
        let value = part.parse::<f64>().map_err(|_| ThriftError::Lexical {
            msg: format!("malformed double literal {}", quote(part)),
            line,
            column,
        })?;
        return Ok(Some(TokenKind::Double(value)));
    }

    if IDENT_RX.is_match(part) {
        return Ok(Some(match part {
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            _ => match Keyword::from_str(part) {
                Some(kw) => TokenKind::Kw(kw),
                None => TokenKind::Ident(part.to_owned()),
            },
        }));
    }

    let mut chars = part.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Some(TokenKind::Punct(c))),
        _ => Err(ThriftError::Lexical {
            msg: format!("unexpected input {}", quote(part)),
            line,
            column,
        }),
    }
}

fn unescape(raw: &str, line: usize, column: usize) -> Result<String, ThriftError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {
                return Err(ThriftError::Lexical {
                    msg: "dangling escape in string literal".to_owned(),
                    line,
                    column,
                })
            }
        }
    }
    Ok(out)
}
