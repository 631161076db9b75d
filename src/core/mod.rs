//! # Core Module
//!
//! 프레임워크 전역에서 공유하는 기반 타입을 제공합니다.
//!
//! ### [`errors`] - 통합 에러 처리
//! - **AppError / DataAccessError**: Spring `DataAccessException` 역할
//! - **Pass-through 변환**: `redis::RedisError`를 의미 변경 없이 감쌈
//! - **HTTP 통합**: Actix-Web `ResponseError` 구현

pub mod errors;

pub use errors::*;
