//! 키 핸들러
//!
//! 값의 타입과 무관하게 키 자체를 다루는 명령들입니다.

use std::sync::Arc;

use redis::AsyncCommands;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct KeyHandler {
    template: Arc<RedisTemplate>,
}

impl KeyHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        Ok(conn.exists(key).await?)
    }

    /// 키들을 삭제하고 실제로 삭제된 개수를 반환합니다.
    pub async fn delete(&self, keys: &[&str]) -> AppResult<i64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.template.connection().await?;
        Ok(conn.del(keys).await?)
    }

    /// 만료 시간(초)을 설정합니다. 키가 없으면 `false`.
    pub async fn expire(&self, key: &str, seconds: i64) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        Ok(conn.expire(key, seconds).await?)
    }

    pub async fn persist(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        Ok(conn.persist(key).await?)
    }

    /// 남은 만료 시간(초). 만료 없음은 -1, 키 없음은 -2.
    pub async fn ttl(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.ttl(key).await?)
    }

    pub async fn rename(&self, key: &str, new_key: &str) -> AppResult<()> {
        let mut conn = self.template.connection().await?;
        let _: () = conn.rename(key, new_key).await?;
        Ok(())
    }

    /// 값 타입 (`string`, `list`, `hash`, `set`, `zset`, `stream`, `none`)
    pub async fn key_type(&self, key: &str) -> AppResult<String> {
        let mut conn = self.template.connection().await?;
        let value_type: String = type_cmd(key).query_async(&mut conn).await?;
        Ok(value_type)
    }

    pub async fn keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let mut conn = self.template.connection().await?;
        Ok(conn.keys(pattern).await?)
    }
}

fn type_cmd(key: &str) -> redis::Cmd {
    let mut cmd = redis::cmd("TYPE");
    cmd.arg(key);
    cmd
}

impl RedisHandler for KeyHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Key
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::handlers::test_support::{args, unreachable_template};

    #[test]
    fn test_type_command() {
        assert_eq!(args(&type_cmd("user:1")), vec!["TYPE", "user:1"]);
    }

    #[tokio::test]
    async fn test_delete_nothing_skips_the_server() {
        let handler = KeyHandler::new(unreachable_template());

        assert_eq!(handler.delete(&[]).await.unwrap(), 0);
    }
}
