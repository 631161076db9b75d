//! 정렬 집합 핸들러

use std::sync::Arc;

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct ZsetHandler {
    template: Arc<RedisTemplate>,
}

impl ZsetHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 점수와 함께 멤버를 추가합니다. 새 멤버면 `true`.
    pub async fn add<T: Serialize + ?Sized>(&self, key: &str, member: &T, score: f64) -> AppResult<bool> {
        let json = self.template.serialize(member)?;
        let mut conn = self.template.connection().await?;
        let added: i64 = conn.zadd(key, json, score).await?;
        Ok(added > 0)
    }

    pub async fn remove<T: Serialize + ?Sized>(&self, key: &str, member: &T) -> AppResult<bool> {
        let json = self.template.serialize(member)?;
        let mut conn = self.template.connection().await?;
        let removed: i64 = conn.zrem(key, json).await?;
        Ok(removed > 0)
    }

    pub async fn score<T: Serialize + ?Sized>(&self, key: &str, member: &T) -> AppResult<Option<f64>> {
        let json = self.template.serialize(member)?;
        let mut conn = self.template.connection().await?;
        Ok(conn.zscore(key, json).await?)
    }

    /// 오름차순 순위 (0부터)
    pub async fn rank<T: Serialize + ?Sized>(&self, key: &str, member: &T) -> AppResult<Option<i64>> {
        let json = self.template.serialize(member)?;
        let mut conn = self.template.connection().await?;
        Ok(conn.zrank(key, json).await?)
    }

    pub async fn range<T: DeserializeOwned>(&self, key: &str, start: isize, stop: isize) -> AppResult<Vec<T>> {
        let mut conn = self.template.connection().await?;
        let raw: Vec<String> = conn.zrange(key, start, stop).await?;
        self.decode_all(raw)
    }

    pub async fn range_by_score<T: DeserializeOwned>(&self, key: &str, min: f64, max: f64) -> AppResult<Vec<T>> {
        let mut conn = self.template.connection().await?;
        let raw: Vec<String> = conn.zrangebyscore(key, min, max).await?;
        self.decode_all(raw)
    }

    /// 점수를 증가시키고 새 점수를 반환합니다.
    pub async fn increment_score<T: Serialize + ?Sized>(&self, key: &str, member: &T, delta: f64) -> AppResult<f64> {
        let json = self.template.serialize(member)?;
        let mut conn = self.template.connection().await?;
        Ok(conn.zincr(key, json, delta).await?)
    }

    pub async fn size(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.zcard(key).await?)
    }

    fn decode_all<T: DeserializeOwned>(&self, raw: Vec<String>) -> AppResult<Vec<T>> {
        raw.iter().map(|json| self.template.deserialize(json.as_bytes())).collect()
    }
}

impl RedisHandler for ZsetHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Zset
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::handlers::test_support::{unreachable_template, unserializable};
    use crate::core::errors::AppError;

    #[test]
    fn test_range_members_are_decoded_in_score_order() {
        let handler = ZsetHandler::new(unreachable_template());
        let raw = vec!["\"bronze\"".to_string(), "\"gold\"".to_string()];

        let members: Vec<String> = handler.decode_all(raw).unwrap();

        assert_eq!(members, vec!["bronze".to_string(), "gold".to_string()]);
    }

    #[tokio::test]
    async fn test_member_lookups_serialize_before_connecting() {
        let handler = ZsetHandler::new(unreachable_template());
        let member = unserializable();

        assert!(matches!(handler.add("rank", &member, 1.0).await, Err(AppError::Serialization(_))));
        assert!(matches!(handler.score("rank", &member).await, Err(AppError::Serialization(_))));
        assert!(matches!(
            handler.increment_score("rank", &member, 2.5).await,
            Err(AppError::Serialization(_))
        ));
    }
}
