//! 기수(HyperLogLog) 핸들러

use std::sync::Arc;

use redis::AsyncCommands;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct HyperLogLogHandler {
    template: Arc<RedisTemplate>,
}

impl HyperLogLogHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 원소를 추가합니다. 추정값이 바뀌었으면 `true`.
    pub async fn add(&self, key: &str, elements: &[&str]) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        Ok(conn.pfadd(key, elements).await?)
    }

    /// 여러 키의 합집합 추정 기수
    pub async fn count(&self, keys: &[&str]) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.pfcount(keys).await?)
    }

    /// `source_keys`를 `destination`으로 병합합니다.
    pub async fn union(&self, destination: &str, source_keys: &[&str]) -> AppResult<()> {
        let mut conn = self.template.connection().await?;
        let _: () = conn.pfmerge(destination, source_keys).await?;
        Ok(())
    }
}

impl RedisHandler for HyperLogLogHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::HyperLogLog
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}
