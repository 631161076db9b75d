//! 비트맵 핸들러

use std::sync::Arc;

use redis::AsyncCommands;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct BitmapHandler {
    template: Arc<RedisTemplate>,
}

impl BitmapHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 비트를 설정하고 이전 값을 반환합니다.
    pub async fn set_bit(&self, key: &str, offset: usize, value: bool) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        Ok(conn.setbit(key, offset, value).await?)
    }

    pub async fn get_bit(&self, key: &str, offset: usize) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        Ok(conn.getbit(key, offset).await?)
    }

    /// 1로 설정된 비트 수
    pub async fn bit_count(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.bitcount(key).await?)
    }

    /// 바이트 범위 `[start, end]` 안의 1 비트 수
    pub async fn bit_count_range(&self, key: &str, start: i64, end: i64) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("BITCOUNT").arg(key).arg(start).arg(end).query_async(&mut conn).await?)
    }
}

impl RedisHandler for BitmapHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Bitmap
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}
