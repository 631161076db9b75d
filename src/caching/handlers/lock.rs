//! 분산 락 핸들러
//!
//! `SET key token NX PX ttl`로 락을 잡고, 해제와 연장은 토큰을 비교하는
//! Lua 스크립트로 처리합니다. 다른 소유자의 락은 해제하거나 연장할 수 없습니다.
//!
//! | 배포 형태 | 상호 배제 |
//! |-----------|-----------|
//! | 단일 노드 | 보장 |
//! | 센티널/클러스터 | 페일오버 중 락이 사라질 수 있음 |

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use once_cell::sync::Lazy;
use redis::Script;
use uuid::Uuid;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

static UNLOCK_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#,
    )
});

static RENEW_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("PEXPIRE", KEYS[1], ARGV[2])
else
    return 0
end
"#,
    )
});

/// 획득한 락
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisLock {
    key: String,
    token: String,
}

impl RedisLock {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 소유자 토큰
    pub fn token(&self) -> &str {
        &self.token
    }
}

pub struct RedisLockHandler {
    template: Arc<RedisTemplate>,
}

impl RedisLockHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 락을 시도합니다. 이미 다른 소유자가 있으면 `None`.
    pub async fn lock(&self, key: &str, ttl: Duration) -> AppResult<Option<RedisLock>> {
        let token = Uuid::new_v4().to_string();
        let mut conn = self.template.connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await?;

        match reply {
            Some(_) => {
                debug!("락 획득: {}", key);
                Ok(Some(RedisLock { key: key.to_string(), token }))
            }
            None => Ok(None),
        }
    }

    /// 락을 해제합니다. 이미 만료되었거나 소유자가 바뀌었으면 `false`.
    pub async fn unlock(&self, lock: &RedisLock) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        let deleted: i64 = UNLOCK_SCRIPT
            .key(&lock.key)
            .arg(&lock.token)
            .invoke_async(&mut conn)
            .await?;
        Ok(deleted == 1)
    }

    /// 만료 시간을 연장합니다. 소유자가 아니면 `false`.
    pub async fn renew(&self, lock: &RedisLock, ttl: Duration) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        let renewed: i64 = RENEW_SCRIPT
            .key(&lock.key)
            .arg(&lock.token)
            .arg(ttl_millis(ttl))
            .invoke_async(&mut conn)
            .await?;
        Ok(renewed == 1)
    }

    pub async fn is_locked(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.template.connection().await?;
        let exists: bool = redis::cmd("EXISTS").arg(key).query_async(&mut conn).await?;
        Ok(exists)
    }
}

impl RedisHandler for RedisLockHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::RedisLock
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}

/// 0ms 만료는 Redis가 거부하므로 최소 1ms로 맞추고, `u64`를 넘는 값은 포화시킵니다.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis_is_never_zero() {
        assert_eq!(ttl_millis(Duration::from_secs(0)), 1);
        assert_eq!(ttl_millis(Duration::from_millis(250)), 250);
        assert_eq!(ttl_millis(Duration::from_secs(30)), 30_000);
    }

    #[test]
    fn test_ttl_millis_saturates() {
        assert_eq!(ttl_millis(Duration::MAX), u64::MAX);
        assert_eq!(ttl_millis(Duration::from_secs(u64::MAX / 1000 + 1)), u64::MAX);
    }

    #[test]
    fn test_lock_accessors() {
        let lock = RedisLock { key: "lock:order:1".to_string(), token: "abc".to_string() };

        assert_eq!(lock.key(), "lock:order:1");
        assert_eq!(lock.token(), "abc");
    }
}
