//! Lowers a parsed formula into a flat stack program.
use super::parser::{BinaryOp, Expr, UnaryOp};
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    /// Push `constants[idx]`.
    Push(u32),
    /// Numeric coercion of the top value (`+x`).
    ToNumber,
    Negate,
    Add,
    Sub,
    Mul,
    Div,
    /// Drop the top value (left side of `,`).
    Pop,
}

/// A compiled formula.
///
/// Operands live in a separate constant pool so the op stream stays `Copy`.
/// A well-formed program leaves exactly one value on the stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub ops: Vec<OpCode>,
    pub constants: Vec<Value>,
}

pub struct Compiler {
    program: Program,
}

impl Compiler {
    pub fn compile(expr: &Expr) -> Program {
        let mut compiler = Self { program: Program::default() };
        compiler.emit(expr);
        compiler.program
    }

    /// Post-order walk: operands first, then the operator.
    fn emit(&mut self, expr: &Expr) {
        match expr {
            Expr::Number(n) => self.push_constant(Value::Number(*n)),
            Expr::Text(s) => self.push_constant(Value::Text(s.clone())),
            Expr::Unary { op, operand } => {
                self.emit(operand);
                self.program.ops.push(match op {
                    UnaryOp::Plus => OpCode::ToNumber,
                    UnaryOp::Negate => OpCode::Negate,
                });
            }
            Expr::Binary { op: BinaryOp::Sequence, lhs, rhs } => {
                self.emit(lhs);
                self.program.ops.push(OpCode::Pop);
                self.emit(rhs);
            }
            Expr::Binary { op, lhs, rhs } => {
                self.emit(lhs);
                self.emit(rhs);
                self.program.ops.push(match op {
                    BinaryOp::Add => OpCode::Add,
                    BinaryOp::Subtract => OpCode::Sub,
                    BinaryOp::Multiply => OpCode::Mul,
                    BinaryOp::Divide => OpCode::Div,
                    BinaryOp::Sequence => unreachable!("handled above"),
                });
            }
        }
    }

    fn push_constant(&mut self, value: Value) {
        let idx = self.program.constants.len() as u32;
        self.program.constants.push(value);
        self.program.ops.push(OpCode::Push(idx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{lexer::tokenize, parser::parse};

    fn compile_str(src: &str) -> Program {
        Compiler::compile(&parse(&tokenize(src).unwrap()).unwrap())
    }

    #[test]
    fn test_compile_is_postfix() {
        let program = compile_str("1 + 2 * 3");
        assert_eq!(
            program.ops,
            vec![OpCode::Push(0), OpCode::Push(1), OpCode::Push(2), OpCode::Mul, OpCode::Add]
        );
        assert_eq!(program.constants.len(), 3);
    }

    #[test]
    fn test_sequence_drops_left_value() {
        let program = compile_str("\"a\", 2");
        assert_eq!(program.ops, vec![OpCode::Push(0), OpCode::Pop, OpCode::Push(1)]);
        assert_eq!(program.constants[0], Value::Text("a".into()));
    }
}
