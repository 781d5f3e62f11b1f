//! Recursive-descent parser for the formula grammar.
//!
//! ```text
//! sequence       := additive ( ',' additive )*
//! additive       := multiplicative ( ('+' | '-') multiplicative )*
//! multiplicative := unary ( ('*' | '/') unary )*
//! unary          := ('+' | '-') unary | primary
//! primary        := NUMBER | STRING | '(' sequence ')'
//! ```
use super::lexer::{Token, TokenKind};
use super::value::FormulaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// Evaluates both sides and keeps the right one.
    Sequence,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
}

/// Deepest expression tree the parser will build. Also bounds how far the
/// parser itself recurses into parentheses and unary operators.
pub const MAX_DEPTH: usize = 256;

pub fn parse(tokens: &[Token]) -> Result<Expr, FormulaError> {
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }
    let mut parser = Parser { tokens, cursor: 0, nesting: 0 };
    let (expr, _) = parser.sequence()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(unexpected(tok)),
    }
}

/// An expression together with the depth of its tree.
type Parsed = (Expr, usize);

struct Parser<'a> {
    tokens: &'a [Token],
    cursor: usize,
    nesting: usize,
}

fn unexpected(tok: &Token) -> FormulaError {
    FormulaError::UnexpectedToken { found: tok.kind.describe(), pos: tok.pos }
}

fn checked_depth(depth: usize) -> Result<usize, FormulaError> {
    if depth > MAX_DEPTH {
        return Err(FormulaError::TooDeep { limit: MAX_DEPTH });
    }
    Ok(depth)
}

fn binary(op: BinaryOp, (lhs, lhs_depth): Parsed, (rhs, rhs_depth): Parsed) -> Result<Parsed, FormulaError> {
    let depth = checked_depth(lhs_depth.max(rhs_depth) + 1)?;
    Ok((Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, depth))
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(tok)
    }

    /// Consumes the next token if `select` maps it to an operator.
    fn eat_op<T>(&mut self, select: impl Fn(&TokenKind) -> Option<T>) -> Option<T> {
        let op = self.peek().and_then(|t| select(&t.kind))?;
        self.cursor += 1;
        Some(op)
    }

    /// Runs `rule` one nesting level deeper, failing once past `MAX_DEPTH`.
    fn nested(&mut self, rule: fn(&mut Self) -> Result<Parsed, FormulaError>) -> Result<Parsed, FormulaError> {
        self.nesting += 1;
        checked_depth(self.nesting)?;
        let parsed = rule(self)?;
        self.nesting -= 1;
        Ok(parsed)
    }

    fn sequence(&mut self) -> Result<Parsed, FormulaError> {
        let mut parsed = self.additive()?;
        while self.eat_op(|k| matches!(k, TokenKind::Comma).then_some(BinaryOp::Sequence)).is_some() {
            let rhs = self.additive()?;
            parsed = binary(BinaryOp::Sequence, parsed, rhs)?;
        }
        Ok(parsed)
    }

    fn additive(&mut self) -> Result<Parsed, FormulaError> {
        let mut parsed = self.multiplicative()?;
        while let Some(op) = self.eat_op(|k| match k {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Subtract),
            _ => None,
        }) {
            let rhs = self.multiplicative()?;
            parsed = binary(op, parsed, rhs)?;
        }
        Ok(parsed)
    }

    fn multiplicative(&mut self) -> Result<Parsed, FormulaError> {
        let mut parsed = self.unary()?;
        while let Some(op) = self.eat_op(|k| match k {
            TokenKind::Star => Some(BinaryOp::Multiply),
            TokenKind::Slash => Some(BinaryOp::Divide),
            _ => None,
        }) {
            let rhs = self.unary()?;
            parsed = binary(op, parsed, rhs)?;
        }
        Ok(parsed)
    }

    fn unary(&mut self) -> Result<Parsed, FormulaError> {
        if let Some(op) = self.eat_op(|k| match k {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Negate),
            _ => None,
        }) {
            let (operand, depth) = self.nested(Self::unary)?;
            let depth = checked_depth(depth + 1)?;
            return Ok((Expr::Unary { op, operand: Box::new(operand) }, depth));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Parsed, FormulaError> {
        let tok = self.advance().ok_or(FormulaError::UnexpectedEnd)?;
        match &tok.kind {
            TokenKind::Number(n) => Ok((Expr::Number(*n), 1)),
            TokenKind::Str(s) => Ok((Expr::Text(s.clone()), 1)),
            TokenKind::LParen => {
                let inner = self.nested(Self::sequence)?;
                match self.advance() {
                    Some(Token { kind: TokenKind::RParen, .. }) => Ok(inner),
                    Some(other) => Err(unexpected(other)),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            _ => Err(unexpected(tok)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::lexer::tokenize;

    fn parse_str(src: &str) -> Result<Expr, FormulaError> {
        parse(&tokenize(src)?)
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Number(n))
    }

    #[test]
    fn test_precedence() {
        let expr = parse_str("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                lhs: num(1.0),
                rhs: Box::new(Expr::Binary { op: BinaryOp::Multiply, lhs: num(2.0), rhs: num(3.0) }),
            }
        );
    }

    #[test]
    fn test_left_associativity() {
        let expr = parse_str("8 - 3 - 1").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Subtract,
                lhs: Box::new(Expr::Binary { op: BinaryOp::Subtract, lhs: num(8.0), rhs: num(3.0) }),
                rhs: num(1.0),
            }
        );
    }

    #[test]
    fn test_unary_and_parentheses() {
        let expr = parse_str("-(2)").unwrap();
        assert_eq!(expr, Expr::Unary { op: UnaryOp::Negate, operand: num(2.0) });
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_str(""), Err(FormulaError::Empty));
        assert_eq!(parse_str("   "), Err(FormulaError::Empty));
        assert_eq!(parse_str("1 +"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse_str("(1 + 2"), Err(FormulaError::UnexpectedEnd));
        assert!(matches!(parse_str("1 2"), Err(FormulaError::UnexpectedToken { pos: 2, .. })));
        assert!(matches!(parse_str("()"), Err(FormulaError::UnexpectedToken { .. })));
        assert!(matches!(parse_str("1 )"), Err(FormulaError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_depth_limit() {
        let at_limit = format!("{}1{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        assert_eq!(parse_str(&at_limit), Ok(Expr::Number(1.0)));

        let too_deep = FormulaError::TooDeep { limit: MAX_DEPTH };
        let nested = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
        assert_eq!(parse_str(&nested), Err(too_deep.clone()));
        assert_eq!(parse_str(&format!("{}1", "-".repeat(5_000))), Err(too_deep.clone()));

        let long_sum = vec!["1"; 5_000].join(" + ");
        assert_eq!(parse_str(&long_sum), Err(too_deep));
        assert!(parse_str(&vec!["1"; 100].join(" + ")).is_ok());
    }
}
