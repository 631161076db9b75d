//! 센티널 핸들러
//!
//! 호출마다 팩토리에서 응답하는 센티널 연결을 새로 얻습니다.

use std::collections::HashMap;
use std::sync::Arc;

use super::RedisHandler;
use crate::caching::connection::RedisSentinelConnection;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::{AppError, AppResult};

pub struct SentinelHandler {
    template: Arc<RedisTemplate>,
}

impl SentinelHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    pub async fn masters(&self) -> AppResult<Vec<HashMap<String, String>>> {
        self.connection().await?.masters().await
    }

    /// 설정된 마스터의 상태
    pub async fn master(&self) -> AppResult<HashMap<String, String>> {
        let name = self.master_name()?;
        self.connection().await?.master(&name).await
    }

    pub async fn replicas(&self) -> AppResult<Vec<HashMap<String, String>>> {
        let name = self.master_name()?;
        self.connection().await?.replicas(&name).await
    }

    /// 설정된 마스터의 강제 페일오버
    pub async fn failover(&self) -> AppResult<()> {
        let name = self.master_name()?;
        self.connection().await?.failover(&name).await
    }

    async fn connection(&self) -> AppResult<RedisSentinelConnection> {
        self.template
            .get_required_connection_factory()
            .get_sentinel_connection()
            .await
    }

    fn master_name(&self) -> AppResult<String> {
        self.template
            .get_required_connection_factory()
            .configuration()
            .master_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidResourceUsage("Redis is not in Sentinel mode".to_string()))
    }
}

impl RedisHandler for SentinelHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Sentinel
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}
