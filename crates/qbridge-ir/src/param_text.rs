//! Parsing of textual parameter expressions such as `2*theta + pi/4`.
//!
//! Frameworks that serialize parameter expressions as strings (Qiskit's
//! `ParameterExpression.__str__`, Braket free-parameter expressions) share
//! this grammar:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := '-' unary | '+' unary | atom
//! atom   := number | 'pi' | 'π' | name | '(' expr ')'
//! ```
//!
//! Names are registered in the supplied [`ParameterRegistry`] as they are
//! encountered. [`Param`]'s `Display` output parses back to an equal value.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{IrError, IrResult};
use crate::parameter::{Param, ParameterRegistry};

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Parse `text` into a [`Param`], registering free parameters in `registry`.
pub fn parse_param(text: &str, registry: &mut ParameterRegistry) -> IrResult<Param> {
    let tokens = lex(text)?;
    let mut parser = ExprParser {
        text,
        tokens,
        pos: 0,
        registry,
    };
    let expr = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr.simplify())
}

fn lex(text: &str) -> IrResult<Vec<Tok>> {
    let mut out = Vec::new();
    let mut chars: Peekable<CharIndices<'_>> = text.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                out.push(Tok::Plus);
            }
            '-' => {
                chars.next();
                out.push(Tok::Minus);
            }
            '*' => {
                chars.next();
                out.push(Tok::Star);
            }
            '/' => {
                chars.next();
                out.push(Tok::Slash);
            }
            '(' => {
                chars.next();
                out.push(Tok::LParen);
            }
            ')' => {
                chars.next();
                out.push(Tok::RParen);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start;
                let mut prev = c;
                while let Some(&(i, d)) = chars.peek() {
                    let exponent_sign = (d == '+' || d == '-') && (prev == 'e' || prev == 'E');
                    if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' || exponent_sign {
                        end = i + d.len_utf8();
                        prev = d;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &text[start..end];
                let value = literal.parse::<f64>().map_err(|_| IrError::ParameterSyntax {
                    text: text.to_string(),
                    reason: format!("invalid number '{literal}'"),
                })?;
                out.push(Tok::Num(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' || d == '[' || d == ']' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push(Tok::Name(text[start..end].to_string()));
            }
            other => {
                return Err(IrError::ParameterSyntax {
                    text: text.to_string(),
                    reason: format!("unexpected character '{other}'"),
                });
            }
        }
    }
    Ok(out)
}

struct ExprParser<'a> {
    text: &'a str,
    tokens: Vec<Tok>,
    pos: usize,
    registry: &'a mut ParameterRegistry,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, reason: &str) -> IrError {
        IrError::ParameterSyntax {
            text: self.text.to_string(),
            reason: reason.to_string(),
        }
    }

    fn expr(&mut self) -> IrResult<Param> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some(Tok::Plus) => {
                    self.advance();
                    let rhs = self.term()?;
                    lhs = Param::Add(Box::new(lhs), Box::new(rhs));
                }
                Some(Tok::Minus) => {
                    self.advance();
                    let rhs = self.term()?;
                    lhs = Param::Sub(Box::new(lhs), Box::new(rhs));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> IrResult<Param> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek() {
                Some(Tok::Star) => {
                    self.advance();
                    let rhs = self.unary()?;
                    lhs = Param::Mul(Box::new(lhs), Box::new(rhs));
                }
                Some(Tok::Slash) => {
                    self.advance();
                    let rhs = self.unary()?;
                    lhs = Param::Div(Box::new(lhs), Box::new(rhs));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> IrResult<Param> {
        match self.peek() {
            Some(Tok::Minus) => {
                self.advance();
                Ok(Param::Neg(Box::new(self.unary()?)))
            }
            Some(Tok::Plus) => {
                self.advance();
                self.unary()
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> IrResult<Param> {
        match self.advance() {
            Some(Tok::Num(v)) => Ok(Param::Const(v)),
            Some(Tok::Name(name)) if name == "pi" || name == "π" => Ok(Param::Pi),
            Some(Tok::Name(name)) => Ok(Param::Ref(self.registry.register(name))),
            Some(Tok::LParen) => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Tok::RParen) => Ok(inner),
                    _ => Err(self.error("missing ')'")),
                }
            }
            Some(_) => Err(self.error("expected a number, name or '('")),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Bindings;
    use std::f64::consts::PI;

    #[test]
    fn test_number() {
        let mut reg = ParameterRegistry::new();
        assert_eq!(parse_param("0.5", &mut reg).unwrap(), Param::Const(0.5));
        assert_eq!(parse_param("1e-3", &mut reg).unwrap(), Param::Const(1e-3));
        assert_eq!(parse_param("-2.5E+1", &mut reg).unwrap().as_f64(), Some(-25.0));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_precedence() {
        let mut reg = ParameterRegistry::new();
        let p = parse_param("1 + 2 * 3 - 4 / 2", &mut reg).unwrap();
        assert_eq!(p.as_f64(), Some(5.0));
        let p = parse_param("(1 + 2) * 3", &mut reg).unwrap();
        assert_eq!(p.as_f64(), Some(9.0));
    }

    #[test]
    fn test_symbols_registered_in_order() {
        let mut reg = ParameterRegistry::new();
        let p = parse_param("2*theta + phi - theta/pi", &mut reg).unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(0).unwrap().name, "theta");
        assert_eq!(reg.get(1).unwrap().name, "phi");

        let b = Bindings::new().with("theta", PI).with("phi", 1.0);
        let v = p.evaluate(&b).unwrap();
        assert!((v - (2.0 * PI + 1.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_vector_element_names() {
        let mut reg = ParameterRegistry::new();
        let p = parse_param("θ[0] + θ[1]", &mut reg).unwrap();
        assert_eq!(p.refs().len(), 2);
        assert_eq!(reg.get(1).unwrap().name, "θ[1]");
    }

    #[test]
    fn test_display_parses_back() {
        let mut reg = ParameterRegistry::new();
        let p = parse_param("-(a * 0.25) + pi / b", &mut reg).unwrap();
        let text = p.to_string();
        let again = parse_param(&text, &mut reg).unwrap();
        assert_eq!(p, again);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_errors() {
        let mut reg = ParameterRegistry::new();
        assert!(matches!(
            parse_param("theta +", &mut reg),
            Err(IrError::ParameterSyntax { .. })
        ));
        assert!(parse_param("(theta", &mut reg).is_err());
        assert!(parse_param("theta $ 2", &mut reg).is_err());
        assert!(parse_param("1 2", &mut reg).is_err());
    }
}
