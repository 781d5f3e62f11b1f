use super::bytecode::OpCode;
use super::value::{FormulaError, Value};

/// Applies a binary operator.
///
/// `+` concatenates as soon as either side is text; the other operators
/// coerce both sides to numbers.
pub fn apply_binary(op: OpCode, lhs: Value, rhs: Value) -> Result<Value, FormulaError> {
    match op {
        OpCode::Add => match (lhs, rhs) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (l, r) => Ok(Value::Text(l.to_text() + &r.to_text())),
        },
        OpCode::Sub => Ok(Value::Number(lhs.to_number() - rhs.to_number())),
        OpCode::Mul => Ok(Value::Number(lhs.to_number() * rhs.to_number())),
        OpCode::Div => {
            let divisor = rhs.to_number();
            if divisor == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            Ok(Value::Number(lhs.to_number() / divisor))
        }
        other => Err(FormulaError::Mismatch { msg: format!("{:?} is not a binary operator", other) }),
    }
}

pub fn apply_unary(op: OpCode, operand: Value) -> Result<Value, FormulaError> {
    match op {
        OpCode::ToNumber => Ok(Value::Number(operand.to_number())),
        OpCode::Negate => Ok(Value::Number(-operand.to_number())),
        other => Err(FormulaError::Mismatch { msg: format!("{:?} is not a unary operator", other) }),
    }
}
