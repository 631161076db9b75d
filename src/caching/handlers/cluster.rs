//! 클러스터 핸들러

use std::sync::Arc;

use super::RedisHandler;
use crate::caching::connection::RedisClusterConnection;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct ClusterHandler {
    template: Arc<RedisTemplate>,
}

impl ClusterHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    pub async fn cluster_info(&self) -> AppResult<String> {
        self.connection().await?.cluster_info().await
    }

    pub async fn cluster_nodes(&self) -> AppResult<String> {
        self.connection().await?.cluster_nodes().await
    }

    pub async fn key_slot(&self, key: &str) -> AppResult<i64> {
        self.connection().await?.key_slot(key).await
    }

    pub async fn count_keys_in_slot(&self, slot: i64) -> AppResult<i64> {
        self.connection().await?.count_keys_in_slot(slot).await
    }

    /// 클러스터 모드가 아니면 `InvalidResourceUsage`로 실패합니다.
    async fn connection(&self) -> AppResult<RedisClusterConnection> {
        self.template
            .get_required_connection_factory()
            .get_cluster_connection()
            .await
    }
}

impl RedisHandler for ClusterHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Cluster
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::connection::{RedisConnectionConfiguration, RedisConnectionFactory};
    use crate::core::errors::AppError;

    #[tokio::test]
    async fn test_requires_cluster_mode() {
        let configuration = RedisConnectionConfiguration::standalone("redis://127.0.0.1:1");
        let factory = RedisConnectionFactory::new(configuration).unwrap();
        let handler = ClusterHandler::new(Arc::new(RedisTemplate::new(Arc::new(factory))));

        match handler.key_slot("user:1").await {
            Err(AppError::InvalidResourceUsage(msg)) => assert_eq!(msg, "Redis is not in Cluster mode"),
            _ => panic!("expected InvalidResourceUsage"),
        }
    }
}
