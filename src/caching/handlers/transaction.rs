//! 트랜잭션 핸들러
//!
//! `MULTI`/`EXEC`로 감싼 파이프라인을 한 번에 전송합니다. 멀티플렉싱 연결 위에서는
//! `WATCH`가 다른 요청과 섞일 수 있으므로 지원하지 않습니다.
//!
//! ```rust,ignore
//! let (count, _): (i64, ()) = handler
//!     .execute(|pipe| {
//!         pipe.incr("visits", 1).expire("visits", 60).ignore();
//!     })
//!     .await?;
//! ```

use std::sync::Arc;

use redis::{FromRedisValue, Pipeline};

use super::pubsub::PubSubHandler;
use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct TransactionHandler {
    template: Arc<RedisTemplate>,
}

impl TransactionHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 명령들을 원자적으로 실행하고 `EXEC` 결과를 반환합니다.
    pub async fn execute<T, F>(&self, build: F) -> AppResult<T>
    where
        T: FromRedisValue,
        F: FnOnce(&mut Pipeline),
    {
        let pipeline = atomic_pipeline(build);
        let mut conn = self.template.connection().await?;
        Ok(pipeline.query_async(&mut conn).await?)
    }

    /// 같은 템플릿을 공유하는 pub/sub 핸들러를 만듭니다.
    pub fn pub_sub_handler(&self) -> PubSubHandler {
        PubSubHandler::new(Arc::clone(&self.template))
    }
}

impl RedisHandler for TransactionHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Transaction
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}

fn atomic_pipeline<F>(build: F) -> Pipeline
where
    F: FnOnce(&mut Pipeline),
{
    let mut pipeline = redis::pipe();
    pipeline.atomic();
    build(&mut pipeline);
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_pipeline_collects_commands() {
        let pipeline = atomic_pipeline(|pipe| {
            pipe.cmd("INCR").arg("visits").cmd("EXPIRE").arg("visits").arg(60).ignore();
        });

        assert_eq!(pipeline.cmd_iter().count(), 2);
    }
}
