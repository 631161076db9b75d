//! 문자열 핸들러
//!
//! 값은 템플릿의 JSON 직렬화기를 거쳐 저장/조회됩니다.
//! 직렬화 없이 원본 문자열을 다루려면 `set_string`/`get_string`을 사용합니다.
//!
//! ```rust,ignore
//! let handler = manager.get_string_handler(0)?;
//! handler.set_ex("session:42", &session, 3600).await?;
//! let cached: Option<Session> = handler.get("session:42").await?;
//! ```

use std::sync::Arc;

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct StringHandler {
    template: Arc<RedisTemplate>,
}

impl StringHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = self.template.serialize(value)?;
        let mut conn = self.template.connection().await?;
        let _: () = conn.set(key, json).await?;
        Ok(())
    }

    /// 만료 시간(초)과 함께 저장합니다.
    pub async fn set_ex<T: Serialize + ?Sized>(&self, key: &str, value: &T, seconds: u64) -> AppResult<()> {
        let json = self.template.serialize(value)?;
        let mut conn = self.template.connection().await?;
        let _: () = conn.set_ex(key, json, seconds).await?;
        Ok(())
    }

    /// 키가 없을 때만 저장합니다 (`SETNX`). 저장했으면 `true`.
    pub async fn set_if_absent<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<bool> {
        let json = self.template.serialize(value)?;
        let mut conn = self.template.connection().await?;
        Ok(conn.set_nx(key, json).await?)
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.template.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        self.template.deserialize_opt(value)
    }

    /// 새 값을 저장하고 이전 값을 반환합니다.
    pub async fn get_and_set<T>(&self, key: &str, value: &T) -> AppResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let json = self.template.serialize(value)?;
        let mut conn = self.template.connection().await?;
        let previous: Option<String> = conn.getset(key, json).await?;
        self.template.deserialize_opt(previous)
    }

    /// 원본 문자열을 덧붙이고 결과 길이를 반환합니다.
    pub async fn append(&self, key: &str, value: &str) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.append(key, value).await?)
    }

    pub async fn strlen(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.strlen(key).await?)
    }

    pub async fn multi_set<T: Serialize>(&self, items: &[(&str, T)]) -> AppResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let encoded = self.encode_items(items)?;
        let mut conn = self.template.connection().await?;
        let _: () = conn.mset(encoded.as_slice()).await?;
        Ok(())
    }

    /// 여러 키를 한 번에 조회합니다. 순서는 `keys`와 같습니다.
    pub async fn multi_get<T: DeserializeOwned>(&self, keys: &[&str]) -> AppResult<Vec<Option<T>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.template.connection().await?;
        let values: Vec<Option<String>> = mget_cmd(keys).query_async(&mut conn).await?;
        values
            .into_iter()
            .map(|v| self.template.deserialize_opt(v))
            .collect()
    }

    pub async fn set_string(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.template.connection().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    pub async fn get_string(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.template.connection().await?;
        Ok(conn.get(key).await?)
    }

    fn encode_items<T: Serialize>(&self, items: &[(&str, T)]) -> AppResult<Vec<(String, String)>> {
        items
            .iter()
            .map(|(k, v)| Ok((k.to_string(), self.template.serialize(v)?)))
            .collect()
    }
}

fn mget_cmd(keys: &[&str]) -> redis::Cmd {
    let mut cmd = redis::cmd("MGET");
    cmd.arg(keys);
    cmd
}

impl RedisHandler for StringHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::String
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}
