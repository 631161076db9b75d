//! # 표현식 파라미터 해석
//!
//! 감사 로그에서 메서드 인자를 가리키는 짧은 표현식(`#id + 1`, `#user?.name`)을
//! 평가합니다. 인자는 이름과 함께 [`EvaluationContext`]에 바인딩되고,
//! 표현식은 AST로 파싱된 뒤 컨텍스트에 대해 평가됩니다.
//!
//! ```rust,ignore
//! let context = get_context(&[json!(42), json!("x")], Some(&["id", "name"]));
//! let next: Option<i64> = get_value(&context, "#id + 1")?;
//! assert_eq!(next, Some(43));
//! ```
//!
//! ## 문법
//!
//! | 구분 | 예시 |
//! |------|------|
//! | 리터럴 | `42`, `1.5`, `'text'`, `"text"`, `true`, `null` |
//! | 변수 | `#name` |
//! | 탐색 | `#user.name`, `#user?.name`, `#list[0]`, `#map['key']` |
//! | 단항 | `-#n`, `!#flag`, `not #flag` |
//! | 산술 | `* / %`, `+ -` |
//! | 비교 | `== != < <= > >=`, `eq ne lt le gt ge` |
//! | 논리 | `and` / `&&`, `or` / `||` |
//! | 조건 | `#a ? 1 : 2`, `#a ?: 'default'` |

mod ast;
mod evaluator;
mod lexer;
mod parser;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::errors::{AppError, AppResult};

/// 표현식이 참조하는 변수 모음
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    variables: HashMap<String, Value>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn lookup_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// 파싱된 표현식
///
/// 같은 표현식을 여러 번 평가할 때 파싱을 한 번만 하도록 보관합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: ast::Expr,
}

impl Expression {
    /// # Errors
    ///
    /// * `Expression` - 문법 오류
    pub fn parse(source: &str) -> AppResult<Self> {
        Ok(Self {
            source: source.to_string(),
            ast: parser::parse(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// 컨텍스트에 대해 평가한 JSON 값
    pub fn evaluate(&self, context: &EvaluationContext) -> AppResult<Value> {
        evaluator::evaluate(&self.ast, context)
    }

    /// 평가 결과를 원하는 타입으로 변환합니다. `null`이면 `None`.
    pub fn value<T: DeserializeOwned>(&self, context: &EvaluationContext) -> AppResult<Option<T>> {
        match self.evaluate(context)? {
            Value::Null => Ok(None),
            value => serde_json::from_value(value).map(Some).map_err(|e| {
                AppError::Expression(format!("Cannot convert result of '{}': {}", self.source, e))
            }),
        }
    }
}

/// 인자 목록을 이름에 바인딩한 컨텍스트를 만듭니다.
///
/// 이름 목록이 없으면 빈 컨텍스트를 반환합니다. 두 목록의 길이가 다르면
/// 짝이 맞는 앞부분만 바인딩합니다.
pub fn get_context(arguments: &[Value], parameter_names: Option<&[&str]>) -> EvaluationContext {
    let mut context = EvaluationContext::new();
    let Some(names) = parameter_names else {
        return context;
    };

    for (name, argument) in names.iter().zip(arguments) {
        context.set_variable(*name, argument.clone());
    }
    context
}

/// 표현식을 파싱하고 평가해 원하는 타입으로 돌려줍니다.
///
/// # Errors
///
/// * `Expression` - 문법 오류, 타입이 맞지 않는 연산, 결과 변환 실패
pub fn get_value<T: DeserializeOwned>(context: &EvaluationContext, key: &str) -> AppResult<Option<T>> {
    Expression::parse(key)?.value(context)
}
