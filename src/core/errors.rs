//! # Data Access Error Handling System
//!
//! Redis 접근 계층과 시스템 로그 유틸리티가 공유하는 통합 에러 타입입니다.
//! Spring의 `DataAccessException` 계층 구조처럼, 백엔드 클라이언트가 무엇이든
//! 호출자는 하나의 일관된 에러 분류만 다루게 됩니다.
//!
//! ## 변환 정책
//!
//! `redis` 크레이트의 에러는 **pass-through** 방식으로 변환됩니다.
//! 원본 [`redis::RedisError`]를 의미 변경 없이 [`AppError::Redis`] 안에 그대로
//! 보관하므로, `kind()`, `code()` 등 원본 정보를 그대로 조회할 수 있습니다.
//!
//! ```rust,ignore
//! use framework_common::core::errors::{AppError, AppResult};
//!
//! async fn ping(conn: &mut NativeConnection) -> AppResult<String> {
//!     // `?` 연산자가 RedisError -> AppError::Redis 변환을 수행
//!     let pong: String = redis::cmd("PING").query_async(conn).await?;
//!     Ok(pong)
//! }
//! ```
//!
//! ## HTTP 응답 매핑
//!
//! | AppError | HTTP Status | 사용 시나리오 |
//! |----------|-------------|---------------|
//! | `Expression` | 400 Bad Request | 잘못된 표현식 |
//! | `MissingRequestContext` | 500 Internal Server Error | 요청 컨텍스트 없음 |
//! | `InvalidResourceUsage` | 500 Internal Server Error | 모드 불일치, 잘못된 DB 인덱스 |
//! | `Redis` | 500 Internal Server Error | Redis 클라이언트 오류 |
//! | `Serialization` | 500 Internal Server Error | JSON 변환 실패 |
//! | `InternalError` | 500 Internal Server Error | 예상치 못한 오류 |

use thiserror::Error;

/// 데이터 접근 계층 전역 에러 타입
///
/// `thiserror`로 `Error` trait을 구현하고, `actix_web::ResponseError`를 구현하여
/// 핸들러에서 그대로 반환할 수 있습니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// Redis 클라이언트 에러 (pass-through)
    ///
    /// 원본 에러를 그대로 감쌉니다. 메시지와 에러 종류는 변하지 않습니다.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// 리소스를 잘못된 방식으로 사용한 경우
    ///
    /// # 발생 시나리오
    /// - 클러스터 모드가 아닌데 클러스터 연결 요청
    /// - 센티널 모드가 아니거나 응답하는 센티널이 없음
    /// - 음수 데이터베이스 인덱스
    /// - 이미 구독 중인 연결에 다시 구독 요청
    #[error("Invalid data access resource usage: {0}")]
    InvalidResourceUsage(String),

    /// 값 직렬화/역직렬화 실패
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 표현식 파싱 또는 평가 실패
    #[error("Expression error: {0}")]
    Expression(String),

    /// 활성화된 HTTP 요청 컨텍스트 없이 요청 메타데이터를 조회한 경우
    #[error("No request context is bound to the current call")]
    MissingRequestContext,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Spring 용어에 맞춘 별칭
pub type DataAccessError = AppError;

impl AppError {
    /// 원본 Redis 에러를 조회합니다. 다른 변형이면 `None`.
    pub fn as_redis_error(&self) -> Option<&redis::RedisError> {
        match self {
            AppError::Redis(e) => Some(e),
            _ => None,
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::http::StatusCode;

        let status = match self {
            AppError::Expression(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        actix_web::HttpResponse::build(status)
            .json(serde_json::json!({
                "error": self.to_string()
            }))
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// 임의의 에러에 문맥 메시지를 붙여 `InternalError`로 변환합니다.
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> AppResult<T>;

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_redis_error_is_passed_through() {
        let original = redis::RedisError::from((redis::ErrorKind::TypeError, "WRONGTYPE", "list".to_string()));
        let error: AppError = original.into();

        let inner = error.as_redis_error().expect("redis variant");
        assert_eq!(inner.kind(), redis::ErrorKind::TypeError);
        assert!(error.to_string().contains("WRONGTYPE"));
    }

    #[test]
    fn test_expression_error_response() {
        let error = AppError::Expression("unexpected token".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_resource_usage_response() {
        let error = AppError::InvalidResourceUsage("Redis is not in Cluster mode".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.to_string().contains("Cluster mode"));
    }

    #[test]
    fn test_serialization_error_from_serde() {
        let parse: Result<i32, _> = serde_json::from_str::<i32>("not json");
        let error: AppError = parse.unwrap_err().into();

        assert!(matches!(error, AppError::Serialization(_)));
    }

    #[test]
    fn test_error_context_trait() {
        let result: Result<(), &str> = Err("original error");
        let app_result = result.context("Additional context");

        assert!(app_result.is_err());
        if let Err(AppError::InternalError(msg)) = app_result {
            assert!(msg.contains("Additional context"));
            assert!(msg.contains("original error"));
        } else {
            panic!("Expected InternalError");
        }
    }
}
