//! AST 평가
//!
//! 정의되지 않은 변수는 `null`로 평가되고, 산술 연산에 `null`이 섞이면 결과도 `null`입니다.
//! 한쪽이라도 문자열이면 `+`는 문자열 연결로 동작합니다.

use std::cmp::Ordering;

use serde_json::Value;

use super::ast::{BinaryOperator, Expr, UnaryOperator};
use super::EvaluationContext;
use crate::core::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy)]
enum Number {
    /// `i64`과 `u64` 범위를 모두 담습니다.
    Int(i128),
    Float(f64),
}

impl Number {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number
                .as_i64()
                .map(i128::from)
                .or_else(|| number.as_u64().map(i128::from))
                .map(Number::Int)
                .or_else(|| number.as_f64().map(Number::Float)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }
}

pub(crate) fn evaluate(expr: &Expr, context: &EvaluationContext) -> AppResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Variable(name) => Ok(context.lookup_variable(name).cloned().unwrap_or(Value::Null)),
        Expr::Property { target, name, safe } => {
            let target = evaluate(target, context)?;
            property(target, name, *safe)
        }
        Expr::Index { target, index } => {
            let target = evaluate(target, context)?;
            let index = evaluate(index, context)?;
            element(target, &index)
        }
        Expr::Unary { operator, operand } => {
            let operand = evaluate(operand, context)?;
            unary(*operator, operand)
        }
        Expr::Binary { operator: BinaryOperator::And, left, right } => {
            if !truth(&evaluate(left, context)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(truth(&evaluate(right, context)?)?))
        }
        Expr::Binary { operator: BinaryOperator::Or, left, right } => {
            if truth(&evaluate(left, context)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(truth(&evaluate(right, context)?)?))
        }
        Expr::Binary { operator, left, right } => {
            let left = evaluate(left, context)?;
            let right = evaluate(right, context)?;
            binary(*operator, left, right)
        }
        Expr::Ternary { condition, then, otherwise } => {
            if truth(&evaluate(condition, context)?)? {
                evaluate(then, context)
            } else {
                evaluate(otherwise, context)
            }
        }
        Expr::Elvis { value, fallback } => {
            let value = evaluate(value, context)?;
            match &value {
                Value::Null => evaluate(fallback, context),
                Value::String(s) if s.is_empty() => evaluate(fallback, context),
                _ => Ok(value),
            }
        }
    }
}

fn property(target: Value, name: &str, safe: bool) -> AppResult<Value> {
    match target {
        Value::Null if safe => Ok(Value::Null),
        Value::Null => Err(AppError::Expression(format!(
            "Property '{}' cannot be found on null",
            name
        ))),
        Value::Object(mut fields) => Ok(fields.remove(name).unwrap_or(Value::Null)),
        Value::Array(items) if name == "size" || name == "length" => Ok(Value::from(items.len())),
        Value::String(s) if name == "length" => Ok(Value::from(s.chars().count())),
        other => Err(AppError::Expression(format!(
            "Property '{}' cannot be found on {}",
            name,
            type_name(&other)
        ))),
    }
}

fn element(target: Value, index: &Value) -> AppResult<Value> {
    match (target, index) {
        (Value::Object(mut fields), Value::String(key)) => Ok(fields.remove(key).unwrap_or(Value::Null)),
        (Value::Array(mut items), index) => {
            let position = array_position(index, items.len())?;
            Ok(items.swap_remove(position))
        }
        (Value::String(s), index) => {
            let chars: Vec<char> = s.chars().collect();
            let position = array_position(index, chars.len())?;
            Ok(Value::String(chars[position].to_string()))
        }
        (Value::Null, _) => Err(AppError::Expression("Cannot index into a null value".to_string())),
        (other, _) => Err(AppError::Expression(format!("Cannot index into {}", type_name(&other)))),
    }
}

fn array_position(index: &Value, len: usize) -> AppResult<usize> {
    let position = index
        .as_u64()
        .ok_or_else(|| AppError::Expression(format!("Invalid index {}", index)))?;
    let position = usize::try_from(position).unwrap_or(usize::MAX);
    if position >= len {
        return Err(AppError::Expression(format!(
            "Index {} out of bounds for length {}",
            position, len
        )));
    }
    Ok(position)
}

fn unary(operator: UnaryOperator, operand: Value) -> AppResult<Value> {
    match operator {
        UnaryOperator::Not => Ok(Value::Bool(!truth(&operand)?)),
        UnaryOperator::Negate => match Number::from_value(&operand) {
            Some(Number::Int(value)) => integer(value.checked_neg()),
            Some(Number::Float(value)) => Ok(Value::from(-value)),
            None if operand.is_null() => Ok(Value::Null),
            None => Err(AppError::Expression(format!("Cannot negate {}", type_name(&operand)))),
        },
    }
}

fn binary(operator: BinaryOperator, left: Value, right: Value) -> AppResult<Value> {
    match operator {
        BinaryOperator::Add if left.is_string() || right.is_string() => {
            Ok(Value::String(format!("{}{}", render(&left), render(&right))))
        }
        BinaryOperator::Add
        | BinaryOperator::Subtract
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Remainder => arithmetic(operator, &left, &right),
        BinaryOperator::Equal => Ok(Value::Bool(equals(&left, &right))),
        BinaryOperator::NotEqual => Ok(Value::Bool(!equals(&left, &right))),
        BinaryOperator::Less => Ok(Value::Bool(compare(&left, &right)? == Ordering::Less)),
        BinaryOperator::LessEqual => Ok(Value::Bool(compare(&left, &right)? != Ordering::Greater)),
        BinaryOperator::Greater => Ok(Value::Bool(compare(&left, &right)? == Ordering::Greater)),
        BinaryOperator::GreaterEqual => Ok(Value::Bool(compare(&left, &right)? != Ordering::Less)),
        BinaryOperator::And | BinaryOperator::Or => {
            let result = match operator {
                BinaryOperator::And => truth(&left)? && truth(&right)?,
                _ => truth(&left)? || truth(&right)?,
            };
            Ok(Value::Bool(result))
        }
    }
}

fn arithmetic(operator: BinaryOperator, left: &Value, right: &Value) -> AppResult<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    let (l, r) = match (Number::from_value(left), Number::from_value(right)) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            return Err(AppError::Expression(format!(
                "Operator {:?} is not supported between {} and {}",
                operator,
                type_name(left),
                type_name(right)
            )))
        }
    };

    if let (Number::Int(l), Number::Int(r)) = (l, r) {
        let result = match operator {
            BinaryOperator::Add => l.checked_add(r),
            BinaryOperator::Subtract => l.checked_sub(r),
            BinaryOperator::Multiply => l.checked_mul(r),
            BinaryOperator::Divide | BinaryOperator::Remainder if r == 0 => {
                return Err(AppError::Expression("Division by zero".to_string()))
            }
            BinaryOperator::Divide => l.checked_div(r),
            _ => l.checked_rem(r),
        };
        return integer(result);
    }

    let (l, r) = (l.as_f64(), r.as_f64());
    if r == 0.0 && matches!(operator, BinaryOperator::Divide | BinaryOperator::Remainder) {
        return Err(AppError::Expression("Division by zero".to_string()));
    }
    let result = match operator {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => l / r,
        _ => l % r,
    };
    if !result.is_finite() {
        return Err(AppError::Expression(format!("Result of {:?} is not a finite number", operator)));
    }
    Ok(Value::from(result))
}

/// 정수 결과를 JSON 숫자로 바꿉니다. `i64`와 `u64` 어디에도 맞지 않으면 오버플로입니다.
fn integer(result: Option<i128>) -> AppResult<Value> {
    let overflow = || AppError::Expression("Integer overflow".to_string());
    let value = result.ok_or_else(overflow)?;
    if let Ok(signed) = i64::try_from(value) {
        return Ok(Value::from(signed));
    }
    u64::try_from(value).map(Value::from).map_err(|_| overflow())
}

fn equals(left: &Value, right: &Value) -> bool {
    match (Number::from_value(left), Number::from_value(right)) {
        (Some(Number::Int(l)), Some(Number::Int(r))) => l == r,
        (Some(l), Some(r)) => l.as_f64() == r.as_f64(),
        _ => left == right,
    }
}

/// `null`은 다른 모든 값보다 작습니다.
fn compare(left: &Value, right: &Value) -> AppResult<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => return Ok(Ordering::Equal),
        (Value::Null, _) => return Ok(Ordering::Less),
        (_, Value::Null) => return Ok(Ordering::Greater),
        (Value::String(l), Value::String(r)) => return Ok(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => return Ok(l.cmp(r)),
        _ => {}
    }

    match (Number::from_value(left), Number::from_value(right)) {
        (Some(Number::Int(l)), Some(Number::Int(r))) => Ok(l.cmp(&r)),
        (Some(l), Some(r)) => l
            .as_f64()
            .partial_cmp(&r.as_f64())
            .ok_or_else(|| AppError::Expression("Cannot compare NaN".to_string())),
        _ => Err(AppError::Expression(format!(
            "Cannot compare {} with {}",
            type_name(left),
            type_name(right)
        ))),
    }
}

fn truth(value: &Value) -> AppResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(AppError::Expression(format!(
            "Cannot convert {} to boolean",
            type_name(other)
        ))),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse;
    use super::*;
    use serde_json::json;

    fn eval(source: &str, context: &EvaluationContext) -> AppResult<Value> {
        evaluate(&parse(source)?, context)
    }

    fn context() -> EvaluationContext {
        let mut context = EvaluationContext::new();
        context.set_variable("id", json!(42));
        context.set_variable("name", json!("redis"));
        context.set_variable("price", json!(1.5));
        context.set_variable("user", json!({"name": "kim", "roles": ["admin", "user"], "age": 30}));
        context.set_variable("empty", json!(""));
        context
    }

    #[test]
    fn test_arithmetic() {
        let ctx = context();

        assert_eq!(eval("#id + 1", &ctx).unwrap(), json!(43));
        assert_eq!(eval("#id * 2 - 4 / 2", &ctx).unwrap(), json!(82));
        assert_eq!(eval("#id % 5", &ctx).unwrap(), json!(2));
        assert_eq!(eval("#price * 2", &ctx).unwrap(), json!(3.0));
        assert_eq!(eval("-(#id)", &ctx).unwrap(), json!(-42));
        assert_eq!(eval("7 / 2", &ctx).unwrap(), json!(3));
    }

    #[test]
    fn test_null_propagates_through_arithmetic() {
        let ctx = context();

        assert_eq!(eval("#missing + 1", &ctx).unwrap(), Value::Null);
        assert_eq!(eval("-#missing", &ctx).unwrap(), Value::Null);
    }

    #[test]
    fn test_string_concatenation() {
        let ctx = context();

        assert_eq!(eval("'user:' + #id", &ctx).unwrap(), json!("user:42"));
        assert_eq!(eval("#name + '-' + #user.name", &ctx).unwrap(), json!("redis-kim"));
        assert_eq!(eval("'v' + #missing", &ctx).unwrap(), json!("vnull"));
    }

    #[test]
    fn test_navigation() {
        let ctx = context();

        assert_eq!(eval("#user.roles[1]", &ctx).unwrap(), json!("user"));
        assert_eq!(eval("#user['age']", &ctx).unwrap(), json!(30));
        assert_eq!(eval("#user.roles.size", &ctx).unwrap(), json!(2));
        assert_eq!(eval("#missing?.name", &ctx).unwrap(), Value::Null);
        assert!(eval("#missing.name", &ctx).is_err());
        assert!(eval("#user.roles[5]", &ctx).is_err());
    }

    #[test]
    fn test_comparison_and_logic() {
        let ctx = context();

        assert_eq!(eval("#id == 42.0", &ctx).unwrap(), json!(true));
        assert_eq!(eval("#id gt 40 and #name eq 'redis'", &ctx).unwrap(), json!(true));
        assert_eq!(eval("#user.age lt 18 || !(#id != 42)", &ctx).unwrap(), json!(true));
        assert_eq!(eval("#missing < 1", &ctx).unwrap(), json!(true));
        assert!(eval("#name > 1", &ctx).is_err());
        assert!(eval("#id and true", &ctx).is_err());
    }

    #[test]
    fn test_logic_short_circuits() {
        let ctx = context();

        assert_eq!(eval("false and #id", &ctx).unwrap(), json!(false));
        assert_eq!(eval("true or #id", &ctx).unwrap(), json!(true));
    }

    #[test]
    fn test_conditionals() {
        let ctx = context();

        assert_eq!(eval("#id > 10 ? 'big' : 'small'", &ctx).unwrap(), json!("big"));
        assert_eq!(eval("#missing ?: 'default'", &ctx).unwrap(), json!("default"));
        assert_eq!(eval("#empty ?: 'default'", &ctx).unwrap(), json!("default"));
        assert_eq!(eval("#name ?: 'default'", &ctx).unwrap(), json!("redis"));
    }

    #[test]
    fn test_division_by_zero() {
        let ctx = context();

        assert!(eval("#id / 0", &ctx).is_err());
        assert!(eval("#id % 0", &ctx).is_err());
        assert!(matches!(eval("#price / 0", &ctx), Err(AppError::Expression(_))));
        assert!(matches!(eval("#price % 0.0", &ctx), Err(AppError::Expression(_))));
    }

    #[test]
    fn test_unsigned_range_stays_integral() {
        let mut ctx = EvaluationContext::new();
        ctx.set_variable("n", json!(u64::MAX));

        assert_eq!(eval("#n + 0", &ctx).unwrap(), json!(u64::MAX));
        assert_eq!(eval("#n - 1", &ctx).unwrap(), json!(u64::MAX - 1));
        assert_eq!(eval("#n == #n", &ctx).unwrap(), json!(true));
        assert!(matches!(eval("#n + 1", &ctx), Err(AppError::Expression(_))));
        assert!(matches!(eval("#n * #n", &ctx), Err(AppError::Expression(_))));
    }

    #[test]
    fn test_float_overflow_is_reported() {
        let mut ctx = EvaluationContext::new();
        ctx.set_variable("big", json!(f64::MAX));

        assert!(matches!(eval("#big * 10", &ctx), Err(AppError::Expression(_))));
    }
}
