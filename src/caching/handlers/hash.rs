//! 해시 핸들러
//!
//! 필드 이름은 문자열, 필드 값은 JSON으로 저장됩니다.

use std::collections::HashMap;
use std::sync::Arc;

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct HashHandler {
    template: Arc<RedisTemplate>,
}

impl HashHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, field: &str, value: &T) -> AppResult<()> {
        let json = self.template.serialize(value)?;
        let mut conn = self.template.connection().await?;
        let _: i64 = conn.hset(key, field, json).await?;
        Ok(())
    }

    pub async fn put_all<T: Serialize>(&self, key: &str, entries: &HashMap<String, T>) -> AppResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let encoded = self.encode_entries(entries)?;
        let mut conn = self.template.connection().await?;
        let _: () = conn.hset_multiple(key, encoded.as_slice()).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str, field: &str) -> AppResult<Option<T>> {
        let mut conn = self.template.connection().await?;
        let value: Option<String> = conn.hget(key, field).await?;
        self.template.deserialize_opt(value)
    }

    pub async fn entries<T: DeserializeOwned>(&self, key: &str) -> AppResult<HashMap<String, T>> {
        let mut conn = self.template.connection().await?;
        let raw: HashMap<String, String> = conn.hgetall(key).await?;
        self.decode_entries(raw)
    }

    pub async fn keys(&self, key: &str) -> AppResult<Vec<String>> {
        let mut conn = self.template.connection().await?;
        Ok(conn.hkeys(key).await?)
    }

    /// 필드를 삭제하고 삭제된 개수를 반환합니다.
    pub async fn delete(&self, key: &str, fields: &[&str]) -> AppResult<i64> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut conn = self.template.connection().await?;
        Ok(conn.hdel(key, fields).await?)
    }

    pub async fn has_key(&self, key: &str, field: &str) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        Ok(conn.hexists(key, field).await?)
    }

    pub async fn size(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.hlen(key).await?)
    }

    pub async fn increment(&self, key: &str, field: &str, delta: i64) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.hincr(key, field, delta).await?)
    }

    /// 필드 이름순으로 정렬된 (필드, JSON) 목록
    fn encode_entries<T: Serialize>(&self, entries: &HashMap<String, T>) -> AppResult<Vec<(String, String)>> {
        let mut encoded = entries
            .iter()
            .map(|(field, value)| Ok((field.clone(), self.template.serialize(value)?)))
            .collect::<AppResult<Vec<(String, String)>>>()?;
        encoded.sort();
        Ok(encoded)
    }

    fn decode_entries<T: DeserializeOwned>(&self, raw: HashMap<String, String>) -> AppResult<HashMap<String, T>> {
        raw.into_iter()
            .map(|(field, json)| Ok((field, self.template.deserialize(json.as_bytes())?)))
            .collect()
    }
}

impl RedisHandler for HashHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Hash
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
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        age: u32,
    }

    #[test]
    fn test_entries_are_encoded_in_field_order() {
        let handler = HashHandler::new(unreachable_template());
        let entries = HashMap::from([
            ("name".to_string(), serde_json::json!("kim")),
            ("age".to_string(), serde_json::json!(30)),
        ]);

        let encoded = handler.encode_entries(&entries).unwrap();

        assert_eq!(
            encoded,
            vec![
                ("age".to_string(), "30".to_string()),
                ("name".to_string(), "\"kim\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_entries_rejects_invalid_json() {
        let handler = HashHandler::new(unreachable_template());

        let valid: HashMap<String, Profile> = handler
            .decode_entries(HashMap::from([("u1".to_string(), r#"{"age":7}"#.to_string())]))
            .unwrap();
        let invalid: AppResult<HashMap<String, Profile>> =
            handler.decode_entries(HashMap::from([("u2".to_string(), "age=7".to_string())]));

        assert_eq!(valid["u1"], Profile { age: 7 });
        assert!(matches!(invalid, Err(AppError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_empty_inputs_skip_the_server() {
        let handler = HashHandler::new(unreachable_template());

        handler.put_all::<i32>("h", &HashMap::new()).await.unwrap();

        assert_eq!(handler.delete("h", &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_put_rejects_unserializable_value() {
        let handler = HashHandler::new(unreachable_template());

        let result = handler.put("h", "f", &unserializable()).await;

        assert!(matches!(result, Err(AppError::Serialization(_))));
    }
}
