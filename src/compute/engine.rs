use crate::compute::bytecode::{OpCode, Program};
use crate::compute::kernel;
use crate::compute::value::{FormulaError, Value};

pub struct Engine;

impl Engine {
    /// Executes a compiled formula and returns its single result.
    ///
    /// Non-finite numeric results are rejected so callers only ever see
    /// displayable values.
    pub fn run(program: &Program) -> Result<Value, FormulaError> {
        // 1. Validate the program shape once so the loop below can pop freely.
        Self::validate_program(program)?;

        // 2. Stack loop
        let mut stack: Vec<Value> = Vec::with_capacity(program.ops.len());
        for &op in &program.ops {
            match op {
                OpCode::Push(idx) => stack.push(program.constants[idx as usize].clone()),
                OpCode::Pop => {
                    stack.pop();
                }
                OpCode::ToNumber | OpCode::Negate => {
                    let operand = Self::pop(&mut stack)?;
                    stack.push(kernel::apply_unary(op, operand)?);
                }
                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div => {
                    let rhs = Self::pop(&mut stack)?;
                    let lhs = Self::pop(&mut stack)?;
                    stack.push(kernel::apply_binary(op, lhs, rhs)?);
                }
            }
        }

        match Self::pop(&mut stack)? {
            Value::Number(n) if !n.is_finite() => Err(FormulaError::NonFinite),
            value => Ok(value),
        }
    }

    fn pop(stack: &mut Vec<Value>) -> Result<Value, FormulaError> {
        stack.pop().ok_or_else(|| FormulaError::Mismatch { msg: "stack underflow".into() })
    }

    /// Checks constant indices and simulates stack depth before execution.
    fn validate_program(program: &Program) -> Result<(), FormulaError> {
        let mut depth: usize = 0;
        for (i, op) in program.ops.iter().enumerate() {
            let (pops, pushes) = match op {
                OpCode::Push(idx) => {
                    if *idx as usize >= program.constants.len() {
                        return Err(FormulaError::Mismatch {
                            msg: format!("op {} references missing constant {}", i, idx),
                        });
                    }
                    (0, 1)
                }
                OpCode::Pop => (1, 0),
                OpCode::ToNumber | OpCode::Negate => (1, 1),
                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div => (2, 1),
            };
            depth = depth.checked_sub(pops).ok_or_else(|| FormulaError::Mismatch {
                msg: format!("op {} underflows the stack", i),
            })?;
            depth += pushes;
        }

        if depth != 1 {
            return Err(FormulaError::Mismatch {
                msg: format!("program leaves {} values on the stack", depth),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{bytecode::Compiler, lexer::tokenize, parser::parse};
    use rstest::rstest;

    fn eval(src: &str) -> Result<Value, FormulaError> {
        let expr = parse(&tokenize(src)?)?;
        Engine::run(&Compiler::compile(&expr))
    }

    #[rstest]
    #[case("2 + 3", Value::Number(5.0))]
    #[case("2 + 3 * 4", Value::Number(14.0))]
    #[case("(2 + 3) * 4", Value::Number(20.0))]
    #[case("10 / 4", Value::Number(2.5))]
    #[case("- -3", Value::Number(3.0))]
    #[case("\"a\" + \"b\"", Value::Text("ab".into()))]
    #[case("\"n=\" + 1 + 2", Value::Text("n=12".into()))]
    #[case("1 + 2 + \"x\"", Value::Text("3x".into()))]
    #[case("1, 2", Value::Number(2.0))]
    fn test_run(#[case] src: &str, #[case] expected: Value) {
        assert_eq!(eval(src).unwrap(), expected);
    }

    #[test]
    fn test_run_failures() {
        assert_eq!(eval("1 / 0"), Err(FormulaError::DivisionByZero));
        assert_eq!(eval("\"abc\" * 2"), Err(FormulaError::NonFinite));
    }

    #[test]
    fn test_engine_rejects_malformed_programs() {
        let underflow = Program { ops: vec![OpCode::Add], constants: vec![] };
        assert!(matches!(Engine::run(&underflow), Err(FormulaError::Mismatch { .. })));

        let missing = Program { ops: vec![OpCode::Push(3)], constants: vec![Value::Number(1.0)] };
        let err = Engine::run(&missing).unwrap_err();
        assert!(err.to_string().contains("missing constant"));

        let leftover = Program {
            ops: vec![OpCode::Push(0), OpCode::Push(0)],
            constants: vec![Value::Number(1.0)],
        };
        assert!(Engine::run(&leftover).unwrap_err().to_string().contains("2 values"));
    }
}
