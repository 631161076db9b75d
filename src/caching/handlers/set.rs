//! 무순서 집합 핸들러

use std::sync::Arc;

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct SetHandler {
    template: Arc<RedisTemplate>,
}

impl SetHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 멤버들을 추가하고 새로 추가된 개수를 반환합니다.
    pub async fn add<T: Serialize>(&self, key: &str, members: &[T]) -> AppResult<i64> {
        if members.is_empty() {
            return Ok(0);
        }
        let encoded = self.encode_all(members)?;
        let mut conn = self.template.connection().await?;
        Ok(conn.sadd(key, encoded).await?)
    }

    pub async fn remove<T: Serialize>(&self, key: &str, members: &[T]) -> AppResult<i64> {
        if members.is_empty() {
            return Ok(0);
        }
        let encoded = self.encode_all(members)?;
        let mut conn = self.template.connection().await?;
        Ok(conn.srem(key, encoded).await?)
    }

    pub async fn members<T: DeserializeOwned>(&self, key: &str) -> AppResult<Vec<T>> {
        let mut conn = self.template.connection().await?;
        let raw: Vec<String> = conn.smembers(key).await?;
        self.decode_all(raw)
    }

    pub async fn is_member<T: Serialize + ?Sized>(&self, key: &str, member: &T) -> AppResult<bool> {
        let json = self.template.serialize(member)?;
        let mut conn = self.template.connection().await?;
        Ok(conn.sismember(key, json).await?)
    }

    pub async fn size(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.scard(key).await?)
    }

    /// 임의의 멤버 하나를 꺼냅니다.
    pub async fn pop<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.template.connection().await?;
        let value: Option<String> = conn.spop(key).await?;
        self.template.deserialize_opt(value)
    }

    pub async fn intersect<T: DeserializeOwned>(&self, keys: &[&str]) -> AppResult<Vec<T>> {
        let mut conn = self.template.connection().await?;
        let raw: Vec<String> = conn.sinter(keys).await?;
        self.decode_all(raw)
    }

    pub async fn union<T: DeserializeOwned>(&self, keys: &[&str]) -> AppResult<Vec<T>> {
        let mut conn = self.template.connection().await?;
        let raw: Vec<String> = conn.sunion(keys).await?;
        self.decode_all(raw)
    }

    /// 첫 번째 키의 집합에서 나머지 집합들을 뺀 결과
    pub async fn difference<T: DeserializeOwned>(&self, keys: &[&str]) -> AppResult<Vec<T>> {
        let mut conn = self.template.connection().await?;
        let raw: Vec<String> = conn.sdiff(keys).await?;
        self.decode_all(raw)
    }

    fn encode_all<T: Serialize>(&self, members: &[T]) -> AppResult<Vec<String>> {
        members.iter().map(|m| self.template.serialize(m)).collect()
    }

    fn decode_all<T: DeserializeOwned>(&self, raw: Vec<String>) -> AppResult<Vec<T>> {
        raw.iter().map(|json| self.template.deserialize(json.as_bytes())).collect()
    }
}

impl RedisHandler for SetHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Set
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}
