//! Lua 스크립트 핸들러
//!
//! `redis::Script`는 `EVALSHA`를 먼저 시도하고, 서버에 스크립트가 없으면
//! 자동으로 `SCRIPT LOAD` 후 재시도합니다.

use std::sync::Arc;

use redis::{FromRedisValue, Script};

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct ScriptHandler {
    template: Arc<RedisTemplate>,
}

impl ScriptHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 스크립트를 실행합니다.
    ///
    /// ```rust,ignore
    /// let count: i64 = handler
    ///     .execute("return redis.call('INCRBY', KEYS[1], ARGV[1])", &["counter"], &["5"])
    ///     .await?;
    /// ```
    pub async fn execute<T: FromRedisValue>(&self, lua: &str, keys: &[&str], args: &[&str]) -> AppResult<T> {
        let script = Script::new(lua);
        self.execute_script(&script, keys, args).await
    }

    /// 미리 만들어 둔 스크립트를 실행합니다.
    pub async fn execute_script<T: FromRedisValue>(&self, script: &Script, keys: &[&str], args: &[&str]) -> AppResult<T> {
        let mut invocation = script.prepare_invoke();
        for key in keys {
            invocation.key(*key);
        }
        for arg in args {
            invocation.arg(*arg);
        }
        let mut conn = self.template.connection().await?;
        Ok(invocation.invoke_async(&mut conn).await?)
    }

    /// 스크립트를 서버에 적재하고 SHA1을 반환합니다.
    pub async fn load(&self, lua: &str) -> AppResult<String> {
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("SCRIPT").arg("LOAD").arg(lua).query_async(&mut conn).await?)
    }

    pub async fn exists(&self, sha: &str) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        let flags: Vec<bool> = redis::cmd("SCRIPT").arg("EXISTS").arg(sha).query_async(&mut conn).await?;
        Ok(flags.first().copied().unwrap_or(false))
    }
}

impl RedisHandler for ScriptHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Script
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}
