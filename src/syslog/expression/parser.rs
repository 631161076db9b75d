//! 우선순위 기반 재귀 하강 파서

use serde_json::Value;

use super::ast::{BinaryOperator, Expr, UnaryOperator};
use super::lexer::{tokenize, Token};
use crate::core::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Conditional,
    LogicOr,
    LogicAnd,
    Comparison,
    Term,
    Factor,
}

fn precedence_of(token: &Token) -> Precedence {
    match token {
        Token::Question | Token::Elvis => Precedence::Conditional,
        Token::Or => Precedence::LogicOr,
        Token::And => Precedence::LogicAnd,
        Token::Eq | Token::NotEq | Token::Lt | Token::LtEq | Token::Gt | Token::GtEq => Precedence::Comparison,
        Token::Plus | Token::Minus => Precedence::Term,
        Token::Asterisk | Token::Slash | Token::Percent => Precedence::Factor,
        _ => Precedence::None,
    }
}

fn binary_operator(token: &Token) -> Option<BinaryOperator> {
    let operator = match token {
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Subtract,
        Token::Asterisk => BinaryOperator::Multiply,
        Token::Slash => BinaryOperator::Divide,
        Token::Percent => BinaryOperator::Remainder,
        Token::Eq => BinaryOperator::Equal,
        Token::NotEq => BinaryOperator::NotEqual,
        Token::Lt => BinaryOperator::Less,
        Token::LtEq => BinaryOperator::LessEqual,
        Token::Gt => BinaryOperator::Greater,
        Token::GtEq => BinaryOperator::GreaterEqual,
        Token::And => BinaryOperator::And,
        Token::Or => BinaryOperator::Or,
        _ => return None,
    };
    Some(operator)
}

/// 표현식 문자열을 AST로 변환합니다.
pub(crate) fn parse(source: &str) -> AppResult<Expr> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(AppError::Expression("Empty expression".to_string()));
    }

    let mut parser = Parser { tokens, position: 0 };
    let expr = parser.parse_expression(Precedence::None)?;
    if let Some(token) = parser.current() {
        return Err(AppError::Expression(format!("Unexpected token {:?} after expression", token)));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn parse_expression(&mut self, precedence: Precedence) -> AppResult<Expr> {
        let mut left = self.parse_unary()?;

        while let Some(token) = self.current() {
            let current = precedence_of(token);
            if current == Precedence::None || precedence >= current {
                break;
            }

            let token = self.advance()?;
            left = match token {
                Token::Question => {
                    let then = self.parse_expression(Precedence::None)?;
                    self.expect(Token::Colon)?;
                    let otherwise = self.parse_expression(Precedence::None)?;
                    Expr::Ternary {
                        condition: Box::new(left),
                        then: Box::new(then),
                        otherwise: Box::new(otherwise),
                    }
                }
                Token::Elvis => {
                    let fallback = self.parse_expression(Precedence::None)?;
                    Expr::Elvis { value: Box::new(left), fallback: Box::new(fallback) }
                }
                other => {
                    let operator = binary_operator(&other)
                        .ok_or_else(|| AppError::Expression(format!("Unexpected token {:?}", other)))?;
                    let right = self.parse_expression(current)?;
                    Expr::Binary { operator, left: Box::new(left), right: Box::new(right) }
                }
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> AppResult<Expr> {
        let operator = match self.current() {
            Some(Token::Minus) => UnaryOperator::Negate,
            Some(Token::Not) => UnaryOperator::Not,
            Some(Token::Plus) => {
                self.advance()?;
                return self.parse_unary();
            }
            _ => return self.parse_postfix(),
        };
        self.advance()?;
        let operand = self.parse_unary()?;
        Ok(Expr::Unary { operator, operand: Box::new(operand) })
    }

    fn parse_postfix(&mut self) -> AppResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current() {
                Some(Token::Dot) | Some(Token::SafeDot) => {
                    let safe = self.advance()? == Token::SafeDot;
                    let name = match self.advance()? {
                        Token::Ident(name) => name,
                        other => {
                            return Err(AppError::Expression(format!(
                                "Expected property name, found {:?}",
                                other
                            )))
                        }
                    };
                    expr = Expr::Property { target: Box::new(expr), name, safe };
                }
                Some(Token::OpenBracket) => {
                    self.advance()?;
                    let index = self.parse_expression(Precedence::None)?;
                    self.expect(Token::CloseBracket)?;
                    expr = Expr::Index { target: Box::new(expr), index: Box::new(index) };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> AppResult<Expr> {
        let expr = match self.advance()? {
            Token::Integer(value) => Expr::Literal(Value::from(value)),
            Token::Float(value) => Expr::Literal(Value::from(value)),
            Token::Str(value) => Expr::Literal(Value::String(value)),
            Token::True => Expr::Literal(Value::Bool(true)),
            Token::False => Expr::Literal(Value::Bool(false)),
            Token::Null => Expr::Literal(Value::Null),
            Token::Variable(name) => Expr::Variable(name),
            Token::OpenParen => {
                let inner = self.parse_expression(Precedence::None)?;
                self.expect(Token::CloseParen)?;
                inner
            }
            other => return Err(AppError::Expression(format!("Unexpected token {:?}", other))),
        };
        Ok(expr)
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> AppResult<Token> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or_else(|| AppError::Expression("Unexpected end of expression".to_string()))?;
        self.position += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token) -> AppResult<()> {
        let token = self.advance()?;
        if token == expected {
            Ok(())
        } else {
            Err(AppError::Expression(format!("Expected {:?}, found {:?}", expected, token)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str) -> Box<Expr> {
        Box::new(Expr::Variable(name.to_string()))
    }

    fn literal(value: i64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::from(value)))
    }

    #[test]
    fn test_factor_binds_tighter_than_term() {
        let expr = parse("#a + #b * 2").unwrap();

        assert_eq!(
            expr,
            Expr::Binary {
                operator: BinaryOperator::Add,
                left: variable("a"),
                right: Box::new(Expr::Binary {
                    operator: BinaryOperator::Multiply,
                    left: variable("b"),
                    right: literal(2),
                }),
            }
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let expr = parse("10 - 3 - 2").unwrap();

        assert_eq!(
            expr,
            Expr::Binary {
                operator: BinaryOperator::Subtract,
                left: Box::new(Expr::Binary {
                    operator: BinaryOperator::Subtract,
                    left: literal(10),
                    right: literal(3),
                }),
                right: literal(2),
            }
        );
    }

    #[test]
    fn test_property_and_index_chain() {
        let expr = parse("#user?.roles[0]").unwrap();

        assert_eq!(
            expr,
            Expr::Index {
                target: Box::new(Expr::Property { target: variable("user"), name: "roles".to_string(), safe: true }),
                index: literal(0),
            }
        );
    }

    #[test]
    fn test_ternary_has_lowest_precedence() {
        let expr = parse("#a or #b ? 1 : 2").unwrap();

        match expr {
            Expr::Ternary { condition, .. } => {
                assert!(matches!(*condition, Expr::Binary { operator: BinaryOperator::Or, .. }))
            }
            other => panic!("expected ternary, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_expressions() {
        assert!(parse("").is_err());
        assert!(parse("#a +").is_err());
        assert!(parse("(#a").is_err());
        assert!(parse("#a #b").is_err());
        assert!(parse("#a ? 1").is_err());
        assert!(parse("#a.").is_err());
    }
}
