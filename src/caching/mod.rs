//! 캐싱 계층 모듈
//!
//! `redis` 크레이트 위에 Spring Data Redis 스타일의 접근 계층을 제공합니다.
//!
//! # 구성
//!
//! - [`connection`] - 단일/클러스터/센티널 연결 팩토리와 pub/sub 구독
//! - [`template`] - 데이터베이스별 공유 템플릿 (JSON 직렬화)
//! - [`handlers`] - 자료구조/기능별 핸들러
//! - [`handler_type`] - 핸들러 종류 테이블
//! - [`manager`] - 템플릿 캐시와 핸들러 조회
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use framework_common::caching::{HandlerManager, RedisConnectionConfiguration, RedisConnectionFactory};
//!
//! let factory = RedisConnectionFactory::new(RedisConnectionConfiguration::standalone("redis://localhost:6379"))?;
//! let manager = HandlerManager::new(Arc::new(factory));
//!
//! let strings = manager.get_string_handler(0)?;
//! strings.set_ex("session:abc", &session, 3600).await?;
//! let cached: Option<Session> = strings.get("session:abc").await?;
//! ```
//!
//! # 환경 설정
//!
//! ```bash
//! REDIS_MODE=standalone              # standalone | cluster | sentinel
//! REDIS_URL=redis://localhost:6379   # 기본값
//! ```

pub mod connection;
pub mod handler_type;
pub mod handlers;
pub mod manager;
pub mod template;

pub use connection::{RedisConnectionConfiguration, RedisConnectionFactory, RedisMode};
pub use handler_type::HandlerType;
pub use handlers::{Handler, RedisHandler};
pub use manager::HandlerManager;
pub use template::RedisTemplate;
