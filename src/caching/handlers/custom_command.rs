//! 사용자 정의 명령 핸들러
//!
//! 다른 핸들러가 다루지 않는 명령(모듈 명령 포함)을 그대로 전송합니다.

use std::sync::Arc;

use redis::{Cmd, FromRedisValue};

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct CustomCommandHandler {
    template: Arc<RedisTemplate>,
}

impl CustomCommandHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// ```rust,ignore
    /// let reply: String = handler.execute("CLIENT", &["GETNAME"]).await?;
    /// ```
    pub async fn execute<T: FromRedisValue>(&self, command: &str, args: &[&str]) -> AppResult<T> {
        self.execute_cmd(&build_command(command, args)).await
    }

    pub async fn execute_cmd<T: FromRedisValue>(&self, cmd: &Cmd) -> AppResult<T> {
        let mut conn = self.template.connection().await?;
        Ok(cmd.query_async(&mut conn).await?)
    }
}

impl RedisHandler for CustomCommandHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::CustomCommand
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}

fn build_command(command: &str, args: &[&str]) -> Cmd {
    let mut cmd = redis::cmd(command);
    for arg in args {
        cmd.arg(*arg);
    }
    cmd
}
