//! 숫자 핸들러
//!
//! 값은 JSON 직렬화 결과와 동일한 정수/실수 문자열로 저장되므로,
//! [`StringHandler`](super::string::StringHandler)로 저장한 숫자에도 그대로 쓸 수 있습니다.

use std::sync::Arc;

use redis::AsyncCommands;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct NumberHandler {
    template: Arc<RedisTemplate>,
}

impl NumberHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    pub async fn increment_by(&self, key: &str, delta: i64) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.incr(key, delta).await?)
    }

    /// `INCRBYFLOAT`
    pub async fn increment_by_float(&self, key: &str, delta: f64) -> AppResult<f64> {
        let mut conn = self.template.connection().await?;
        Ok(incr_by_float_cmd(key, delta).query_async(&mut conn).await?)
    }

    pub async fn decrement_by(&self, key: &str, delta: i64) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(conn.decr(key, delta).await?)
    }

    pub async fn get_i64(&self, key: &str) -> AppResult<Option<i64>> {
        let mut conn = self.template.connection().await?;
        Ok(conn.get(key).await?)
    }

    pub async fn get_f64(&self, key: &str) -> AppResult<Option<f64>> {
        let mut conn = self.template.connection().await?;
        Ok(conn.get(key).await?)
    }
}

fn incr_by_float_cmd(key: &str, delta: f64) -> redis::Cmd {
    let mut cmd = redis::cmd("INCRBYFLOAT");
    cmd.arg(key).arg(delta);
    cmd
}

impl RedisHandler for NumberHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Number
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::handlers::test_support::{args, unreachable_template};
    use crate::core::errors::AppError;

    #[test]
    fn test_float_increment_command() {
        assert_eq!(args(&incr_by_float_cmd("price", 1.5)), vec!["INCRBYFLOAT", "price", "1.5"]);
        assert_eq!(args(&incr_by_float_cmd("price", -0.25)), vec!["INCRBYFLOAT", "price", "-0.25"]);
    }

    #[tokio::test]
    async fn test_unreachable_server_error_passes_through() {
        let handler = NumberHandler::new(unreachable_template());

        let result = handler.increment_by("visits", 1).await;

        assert!(matches!(result, Err(AppError::Redis(_))));
    }
}
