//! Statement parsing.

use super::Parser;
use crate::ast::{GateCall, GateDef, QubitRef, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        match token {
            Token::Include => self.parse_include(),
            Token::Qreg | Token::Creg => self.parse_register_decl(),
            Token::Qubit | Token::Bit => self.parse_typed_decl(),
            Token::Input => self.parse_input_decl(),
            Token::Measure => self.parse_measure(),
            Token::Reset => self.parse_reset(),
            Token::Barrier => self.parse_barrier(),
            Token::Gate => self.parse_gate_def(),
            Token::Opaque => self.parse_opaque(),
            Token::GateU | Token::GateCX => {
                self.advance();
                let name = token.to_string();
                self.parse_gate_call(name).map(Statement::Gate)
            }
            Token::Identifier(_) => self.parse_identifier_statement(),
            other => {
                self.advance();
                Err(self.unexpected("statement", &other))
            }
        }
    }

    fn parse_include(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Include)?;
        let path = match self.advance() {
            Some(Token::StringLiteral(s)) => s,
            Some(other) => return Err(self.unexpected("string literal", &other)),
            None => return Err(ParseError::UnexpectedEof("include path".into())),
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Include(path))
    }

    /// `qreg name[n];` / `creg name[n];`
    fn parse_register_decl(&mut self) -> ParseResult<Statement> {
        let quantum = self.check(&Token::Qreg);
        self.advance();
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.parse_index()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;

        Ok(if quantum {
            Statement::QubitDecl { name, size }
        } else {
            Statement::BitDecl { name, size }
        })
    }

    /// `qubit[n] name;` / `bit name;`
    fn parse_typed_decl(&mut self) -> ParseResult<Statement> {
        let quantum = self.check(&Token::Qubit);
        self.advance();

        let size = if self.consume(&Token::LBracket) {
            let size = self.parse_index()?;
            self.expect(Token::RBracket)?;
            size
        } else {
            1
        };

        let name = self.parse_identifier()?;
        self.expect(Token::Semicolon)?;

        Ok(if quantum {
            Statement::QubitDecl { name, size }
        } else {
            Statement::BitDecl { name, size }
        })
    }

    /// `input float[64] name;` / `input angle name;`
    fn parse_input_decl(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Input)?;
        match self.advance() {
            Some(Token::Float | Token::Angle) => {}
            Some(other) => return Err(self.unexpected("float or angle", &other)),
            None => return Err(ParseError::UnexpectedEof("input type".into())),
        }
        if self.consume(&Token::LBracket) {
            self.parse_index()?;
            self.expect(Token::RBracket)?;
        }
        let name = self.parse_identifier()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::InputDecl { name })
    }

    fn parse_measure(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Measure)?;

        let qubits = self.parse_qubit_refs()?;

        let bits = if self.consume(&Token::Arrow) {
            self.parse_qubit_refs()?
        } else {
            vec![]
        };

        self.expect(Token::Semicolon)?;

        Ok(Statement::Measure { qubits, bits })
    }

    fn parse_reset(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Reset)?;
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Reset { qubits })
    }

    fn parse_barrier(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Barrier)?;
        let qubits = if self.check(&Token::Semicolon) {
            vec![]
        } else {
            self.parse_qubit_refs()?
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Barrier { qubits })
    }

    /// `gate name(a, b) q0, q1 { ... }`
    fn parse_gate_def(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Gate)?;
        let name = self.parse_gate_name()?;

        let params = if self.consume(&Token::LParen) {
            let p = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.parse_identifier_list()?
            };
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_identifier_list()?;

        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while !self.consume(&Token::RBrace) {
            match self.advance() {
                Some(Token::Barrier) => {
                    while !self.consume(&Token::Semicolon) {
                        if self.advance().is_none() {
                            return Err(ParseError::UnexpectedEof("';'".into()));
                        }
                    }
                }
                Some(token @ (Token::Identifier(_) | Token::GateU | Token::GateCX)) => {
                    let callee = match token {
                        Token::Identifier(s) => s,
                        other => other.to_string(),
                    };
                    body.push(self.parse_gate_call(callee)?);
                }
                Some(other) => return Err(self.unexpected("gate call", &other)),
                None => return Err(ParseError::UnexpectedEof("'}'".into())),
            }
        }

        Ok(Statement::GateDef(GateDef {
            name,
            params,
            qubits,
            body,
        }))
    }

    /// `opaque name(a) q;`
    fn parse_opaque(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Opaque)?;
        let name = self.parse_gate_name()?;
        while !self.consume(&Token::Semicolon) {
            if self.advance().is_none() {
                return Err(ParseError::UnexpectedEof("';'".into()));
            }
        }
        Ok(Statement::Opaque { name })
    }

    /// Gate names may shadow the built-in `U` and `CX` tokens.
    fn parse_gate_name(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(token @ (Token::GateU | Token::GateCX)) => Ok(token.to_string()),
            Some(other) => Err(self.unexpected("gate name", &other)),
            None => Err(ParseError::UnexpectedEof("gate name".into())),
        }
    }

    /// A statement starting with an identifier: gate call or `c = measure q;`.
    fn parse_identifier_statement(&mut self) -> ParseResult<Statement> {
        let name = self.parse_identifier()?;

        if self.check(&Token::Eq) || self.check(&Token::LBracket) {
            return self.parse_measure_assignment(name);
        }

        self.parse_gate_call(name).map(Statement::Gate)
    }

    /// `c = measure q;` or `c[i] = measure q[j];`
    fn parse_measure_assignment(&mut self, target: String) -> ParseResult<Statement> {
        let bit = if self.consume(&Token::LBracket) {
            let idx = self.parse_index()?;
            self.expect(Token::RBracket)?;
            QubitRef::single(target, idx)
        } else {
            QubitRef::register(target)
        };

        self.expect(Token::Eq)?;
        match self.advance() {
            Some(Token::Measure) => {}
            Some(other) => {
                return Err(ParseError::UnsupportedStatement(format!(
                    "classical assignment at line {} (found {other})",
                    self.line
                )));
            }
            None => return Err(ParseError::UnexpectedEof("measure".into())),
        }
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Measure {
            qubits,
            bits: vec![bit],
        })
    }

    /// Parse the rest of a gate call once its name is consumed.
    fn parse_gate_call(&mut self, name: String) -> ParseResult<GateCall> {
        let params = if self.consume(&Token::LParen) {
            let p = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;

        Ok(GateCall {
            name,
            params,
            qubits,
        })
    }

    fn parse_qubit_refs(&mut self) -> ParseResult<Vec<QubitRef>> {
        let mut refs = vec![self.parse_qubit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_qubit_ref()?);
        }
        Ok(refs)
    }

    fn parse_qubit_ref(&mut self) -> ParseResult<QubitRef> {
        let register = self.parse_identifier()?;

        if self.consume(&Token::LBracket) {
            let index = self.parse_index()?;
            self.expect(Token::RBracket)?;
            Ok(QubitRef::single(register, index))
        } else {
            Ok(QubitRef::register(register))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Statement;
    use crate::error::ParseError;
    use crate::parser::parse_program;

    #[test]
    fn test_declaration_styles() {
        let program = parse_program(
            "OPENQASM 3.0; qubit[3] q; qubit a; bit[2] c; input float[64] theta; input angle phi;",
        )
        .unwrap();
        assert!(matches!(&program.statements[0], Statement::QubitDecl { size: 3, .. }));
        assert!(matches!(&program.statements[1], Statement::QubitDecl { size: 1, .. }));
        assert!(matches!(&program.statements[3], Statement::InputDecl { name } if name == "theta"));
        assert!(matches!(&program.statements[4], Statement::InputDecl { name } if name == "phi"));
    }

    #[test]
    fn test_measure_forms() {
        let program =
            parse_program("OPENQASM 3.0; qubit[2] q; bit[2] c; c[1] = measure q[0]; measure q -> c;")
                .unwrap();
        match &program.statements[2] {
            Statement::Measure { qubits, bits } => {
                assert_eq!(qubits[0].index, Some(0));
                assert_eq!(bits[0].index, Some(1));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(&program.statements[3], Statement::Measure { .. }));
    }

    #[test]
    fn test_gate_definition_body() {
        let program = parse_program(
            "OPENQASM 2.0; gate majority a, b, c { cx c, b; barrier a, b; cx c, a; ccx a, b, c; }",
        )
        .unwrap();
        match &program.statements[0] {
            Statement::GateDef(def) => {
                assert_eq!(def.name, "majority");
                assert_eq!(def.qubits, vec!["a", "b", "c"]);
                assert_eq!(def.body.len(), 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_builtin_gate_tokens() {
        let program = parse_program("OPENQASM 2.0; qreg q[2]; U(0, 0, pi) q[0]; CX q[0], q[1];").unwrap();
        assert!(matches!(&program.statements[1], Statement::Gate(call) if call.name == "U"));
        assert!(matches!(&program.statements[2], Statement::Gate(call) if call.name == "CX"));
    }

    #[test]
    fn test_classical_assignment_rejected() {
        assert!(matches!(
            parse_program("OPENQASM 3.0; bit c; c = 1;"),
            Err(ParseError::UnsupportedStatement(_))
        ));
    }
}
