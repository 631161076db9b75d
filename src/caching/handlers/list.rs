//! 리스트 핸들러

use std::num::NonZeroUsize;
use std::sync::Arc;

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct ListHandler {
    template: Arc<RedisTemplate>,
}

impl ListHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 왼쪽에 추가하고 리스트 길이를 반환합니다.
    pub async fn left_push<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<i64> {
        let json = self.template.serialize(value)?;
        let mut conn = self.template.connection().await?;
        Ok(conn.lpush(key, json).await?)
    }

    /// 오른쪽에 추가하고 리스트 길이를 반환합니다.
    pub async fn right_push<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<i64> {
        let json = self.template.serialize(value)?;
        let mut conn = self.template.connection().await?;
        Ok(conn.rpush(key, json).await?)
    }

    pub async fn left_pop<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.template.connection().await?;
        let value: Option<String> = conn.lpop(key, None::<NonZeroUsize>).await?;
        self.template.deserialize_opt(value)
    }

    pub async fn right_pop<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.template.connection().await?;
        let value: Option<String> = conn.rpop(key, None::<NonZeroUsize>).await?;
        self.template.deserialize_opt(value)
    }

    /// `LRANGE key start stop` (음수 인덱스는 끝에서부터)
    pub async fn range<T: DeserializeOwned>(&self, key: &str, start: isize, stop: isize) -> AppResult<Vec<T>> {
        let mut conn = self.template.connection().await?;
        let values: Vec<String> = conn.lrange(key, start, stop).await?;
        self.decode_all(&values)
    }

    pub async fn index<T: DeserializeOwned>(&self, key: &str, index: isize) -> AppResult<Option<T>> {
        let mut conn = self.template.connection().await?;
        let value: Option<String> = conn.lindex(key, index).await?;
        self.template.deserialize_opt(value)
    }

    pub async fn size(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.llen(key).await?)
    }

    pub async fn trim(&self, key: &str, start: isize, stop: isize) -> AppResult<()> {
        let mut conn = self.template.connection().await?;
        let _: () = conn.ltrim(key, start, stop).await?;
        Ok(())
    }

    /// `count`개의 일치 항목을 제거합니다 (0이면 전부). 제거된 개수를 반환합니다.
    pub async fn remove<T: Serialize + ?Sized>(&self, key: &str, count: isize, value: &T) -> AppResult<i64> {
        let json = self.template.serialize(value)?;
        let mut conn = self.template.connection().await?;
        Ok(conn.lrem(key, count, json).await?)
    }

    fn decode_all<T: DeserializeOwned>(&self, values: &[String]) -> AppResult<Vec<T>> {
        values
            .iter()
            .map(|v| self.template.deserialize(v.as_bytes()))
            .collect()
    }
}

impl RedisHandler for ListHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::List
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
    fn test_range_values_keep_list_order() {
        let handler = ListHandler::new(unreachable_template());
        let raw = vec!["3".to_string(), "1".to_string(), "2".to_string()];

        let values: Vec<i64> = handler.decode_all(&raw).unwrap();

        assert_eq!(values, vec![3, 1, 2]);
    }

    #[test]
    fn test_one_bad_element_fails_the_range() {
        let handler = ListHandler::new(unreachable_template());
        let raw = vec!["\"ok\"".to_string(), "not json".to_string()];

        let result: AppResult<Vec<String>> = handler.decode_all(&raw);

        assert!(matches!(result, Err(AppError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_push_and_remove_serialize_before_connecting() {
        let handler = ListHandler::new(unreachable_template());

        let pushed = handler.right_push("queue", &unserializable()).await;
        let removed = handler.remove("queue", 0, &unserializable()).await;

        assert!(matches!(pushed, Err(AppError::Serialization(_))));
        assert!(matches!(removed, Err(AppError::Serialization(_))));
    }
}
