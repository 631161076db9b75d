//! framework_common
//!
//! Spring 기반 공통 프레임워크 모듈을 Rust로 옮긴 라이브러리입니다.
//! 감사 로그용 요청 메타데이터 추출과, `redis` 크레이트 위의 Spring Data Redis 스타일
//! 접근 계층을 제공합니다.
//!
//! # Features
//!
//! - **시스템 로그**: 요청 메타데이터 추출, 인자 표현식 평가, 로그 미들웨어
//! - **Redis 연결**: 단일/클러스터/센티널 연결 팩토리, 리액티브 연결
//! - **Redis 핸들러**: 문자열, 리스트, 해시, 셋, 정렬 셋, 비트맵, 지오, 스크립트,
//!   pub/sub, 스트림, 분산 락, 센티널, 클러스터, 트랜잭션
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ SysLogMiddleware │     │  HandlerManager  │ ← 데이터베이스별 템플릿 캐시
//! └──────────────────┘     └──────────────────┘
//!          │                        │
//!          ▼                        ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │  sys_log_utils   │     │ Handlers (19종)  │ ← HandlerType으로 선택
//! │  expression      │     └──────────────────┘
//! └──────────────────┘              │
//!                                   ▼
//!                          ┌──────────────────┐
//!                          │  RedisTemplate   │ ← JSON 직렬화
//!                          └──────────────────┘
//!                                   │
//!                                   ▼
//!                          ┌──────────────────┐
//!                          │ ConnectionFactory│ ← redis 크레이트
//!                          └──────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use framework_common::caching::{HandlerManager, RedisConnectionFactory};
//! use framework_common::config::RedisConfig;
//!
//! let factory = RedisConnectionFactory::new(RedisConfig::from_env()?)?;
//! let manager = HandlerManager::new(Arc::new(factory));
//!
//! let lock = manager.get_redis_lock_handler(0)?;
//! if let Some(guard) = lock.lock("order:7", Duration::from_secs(10)).await? {
//!     // ...
//!     lock.unlock(&guard).await?;
//! }
//! ```

pub mod core;
pub mod config;
pub mod caching;
pub mod syslog;
pub mod routes;
pub mod middlewares;
