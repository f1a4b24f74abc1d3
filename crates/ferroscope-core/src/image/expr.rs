//! Expression grammar understood by heap images.
//!
//! ```text
//! expr    := '*' expr | postfix
//! postfix := primary ( '.' ident | '->' ident | '[' integer ']' )*
//! primary := ident | '(' expr ')'
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

/// Parsed expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr
{
    /// Variable in scope
    Symbol(String),
    /// `base.field`
    Field(Box<Expr>, String),
    /// `base->field`
    Arrow(Box<Expr>, String),
    /// `*base`
    Deref(Box<Expr>),
    /// `base[index]`
    Index(Box<Expr>, u64),
}

/// Parse a whole expression; trailing input is an error
pub fn parse(source: &str) -> Result<Expr, String>
{
    let mut parser = Parser {
        source,
        chars: source.char_indices().peekable(),
    };
    let expr = parser.expr()?;
    parser.skip_whitespace();
    match parser.chars.peek() {
        None => Ok(expr),
        Some(&(at, c)) => Err(format!("unexpected `{c}` at offset {at}")),
    }
}

struct Parser<'a>
{
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_>
{
    fn skip_whitespace(&mut self)
    {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }

    fn eat(&mut self, expected: char) -> bool
    {
        self.skip_whitespace();
        self.chars.next_if(|&(_, c)| c == expected).is_some()
    }

    fn expr(&mut self) -> Result<Expr, String>
    {
        if self.eat('*') {
            return Ok(Expr::Deref(Box::new(self.expr()?)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, String>
    {
        let mut expr = self.primary()?;
        loop {
            if self.eat('.') {
                expr = Expr::Field(Box::new(expr), self.ident()?);
            } else if self.eat('-') {
                if !self.eat('>') {
                    return Err("expected `->`".to_string());
                }
                expr = Expr::Arrow(Box::new(expr), self.ident()?);
            } else if self.eat('[') {
                let index = self.integer()?;
                if !self.eat(']') {
                    return Err("expected `]`".to_string());
                }
                expr = Expr::Index(Box::new(expr), index);
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, String>
    {
        if self.eat('(') {
            let inner = self.expr()?;
            if !self.eat(')') {
                return Err("expected `)`".to_string());
            }
            return Ok(inner);
        }
        self.ident().map(Expr::Symbol)
    }

    fn ident(&mut self) -> Result<String, String>
    {
        self.skip_whitespace();
        let start = match self.chars.peek() {
            Some(&(at, c)) if c.is_ascii_alphabetic() || c == '_' => at,
            Some(&(at, c)) => return Err(format!("expected identifier, found `{c}` at offset {at}")),
            None => return Err("expected identifier, found end of input".to_string()),
        };
        let mut end = start;
        while let Some((at, c)) = self.chars.next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '_') {
            end = at + c.len_utf8();
        }
        Ok(self.source[start..end].to_string())
    }

    fn integer(&mut self) -> Result<u64, String>
    {
        self.skip_whitespace();
        let mut digits = String::new();
        while let Some((_, c)) = self.chars.next_if(|&(_, c)| c.is_ascii_digit()) {
            digits.push(c);
        }
        digits.parse().map_err(|_| "expected array index".to_string())
    }
}
