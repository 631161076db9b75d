//! # Redis Configuration Module
//!
//! 환경 변수로부터 [`RedisConnectionConfiguration`]을 구성합니다.
//! Spring Boot의 `spring.redis.*` 프로퍼티에 해당합니다.
//!
//! ## 환경 변수
//!
//! ```bash
//! # 배포 형태: standalone (기본값) | cluster | sentinel
//! export REDIS_MODE="standalone"
//!
//! # standalone
//! export REDIS_URL="redis://localhost:6379"
//!
//! # cluster
//! export REDIS_CLUSTER_NODES="10.0.0.1:7000,10.0.0.2:7000,10.0.0.3:7000"
//!
//! # sentinel
//! export REDIS_SENTINEL_NODES="10.0.0.1:26379,10.0.0.2:26379"
//! export REDIS_SENTINEL_MASTER="mymaster"
//! export REDIS_SENTINEL_PASSWORD=""
//!
//! # 공통 (REDIS_DATABASE가 없으면 REDIS_URL의 /<db> 사용)
//! export REDIS_DATABASE="0"
//! export REDIS_USERNAME=""
//! export REDIS_PASSWORD=""
//! ```

use std::env;

use crate::caching::connection::{RedisConnectionConfiguration, RedisMode};
use crate::core::errors::{AppResult, ErrorContext};

const DEFAULT_URL: &str = "redis://localhost:6379";
const DEFAULT_SENTINEL_MASTER: &str = "mymaster";

/// Redis 연결 설정
pub struct RedisConfig;

impl RedisConfig {
    /// 현재 프로세스 환경 변수로 연결 설정을 만듭니다.
    ///
    /// # Errors
    ///
    /// * `InternalError` - `REDIS_DATABASE`가 정수가 아님
    /// * `InvalidResourceUsage` - 음수 데이터베이스 인덱스
    pub fn from_env() -> AppResult<RedisConnectionConfiguration> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수로 연결 설정을 만듭니다. 빈 값은 설정되지 않은 것으로 봅니다.
    pub fn from_lookup<F>(lookup: F) -> AppResult<RedisConnectionConfiguration>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mode = get("REDIS_MODE")
            .map(|m| RedisMode::from_str(&m))
            .unwrap_or(RedisMode::Standalone);

        let mut configuration = match mode {
            RedisMode::Standalone => {
                RedisConnectionConfiguration::standalone(get("REDIS_URL").unwrap_or_else(|| DEFAULT_URL.to_string()))
            }
            RedisMode::Cluster => {
                RedisConnectionConfiguration::cluster(split_nodes(get("REDIS_CLUSTER_NODES")))
            }
            RedisMode::Sentinel => RedisConnectionConfiguration::sentinel(
                get("REDIS_SENTINEL_MASTER").unwrap_or_else(|| DEFAULT_SENTINEL_MASTER.to_string()),
                split_nodes(get("REDIS_SENTINEL_NODES")),
            ),
        };

        if let Some(username) = get("REDIS_USERNAME") {
            configuration = configuration.with_username(username);
        }
        if let Some(password) = get("REDIS_PASSWORD") {
            configuration = configuration.with_password(password);
        }
        if let Some(password) = get("REDIS_SENTINEL_PASSWORD") {
            configuration = configuration.with_sentinel_password(password);
        }

        // 없으면 REDIS_URL의 `/<db>` 경로를 따릅니다
        match get("REDIS_DATABASE") {
            Some(value) => {
                let database = value
                    .parse::<i64>()
                    .with_context(|| format!("REDIS_DATABASE must be an integer, got '{}'", value))?;
                configuration.with_database(database)
            }
            None => Ok(configuration),
        }
    }
}

fn split_nodes(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|node| !node.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
