//! # Configuration Module
//!
//! 환경 변수 기반 설정을 한곳에서 관리합니다.
//! Spring Boot의 `application.yml` + `@ConfigurationProperties` 역할을 합니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 실행 프로파일, 서버 바인딩
//! - [`redis_config`] - Redis 연결 설정
//!
//! ## 프로파일별 설정 파일
//!
//! `PROFILE` 값에 따라 `.env.dev`, `.env.test`, `.env.prod` 중 하나를 먼저 읽습니다.
//!
//! ```bash
//! PROFILE=prod cargo run
//! ```
//!
//! ## Spring과의 비교
//!
//! | Spring | Rust (이 프로젝트) |
//! |--------|-------------------|
//! | `spring.profiles.active` | `PROFILE` |
//! | `spring.redis.host` / `port` | `REDIS_URL` |
//! | `spring.redis.cluster.nodes` | `REDIS_CLUSTER_NODES` |
//! | `spring.redis.sentinel.master` | `REDIS_SENTINEL_MASTER` |
//! | `spring.redis.database` | `REDIS_DATABASE` |

pub mod data_config;
pub mod redis_config;

pub use data_config::*;
pub use redis_config::*;
