//! 스트림 핸들러

use std::collections::HashMap;
use std::sync::Arc;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

/// 스트림 항목 (ID와 필드)
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    pub id: String,
    pub fields: HashMap<String, String>,
}

pub struct StreamHandler {
    template: Arc<RedisTemplate>,
}

impl StreamHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 자동 ID(`*`)로 항목을 추가하고 생성된 ID를 반환합니다.
    pub async fn add(&self, key: &str, fields: &[(&str, &str)]) -> AppResult<String> {
        let mut conn = self.template.connection().await?;
        Ok(xadd_cmd(key, fields).query_async(&mut conn).await?)
    }

    pub async fn len(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("XLEN").arg(key).query_async(&mut conn).await?)
    }

    /// `XRANGE key start end [COUNT n]` (`-`와 `+`는 처음과 끝)
    pub async fn range(&self, key: &str, start: &str, end: &str, count: Option<usize>) -> AppResult<Vec<StreamRecord>> {
        let mut conn = self.template.connection().await?;
        let raw: Vec<(String, HashMap<String, String>)> =
            xrange_cmd(key, start, end, count).query_async(&mut conn).await?;
        Ok(raw
            .into_iter()
            .map(|(id, fields)| StreamRecord { id, fields })
            .collect())
    }

    pub async fn delete(&self, key: &str, ids: &[&str]) -> AppResult<i64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("XDEL").arg(key).arg(ids).query_async(&mut conn).await?)
    }

    /// 최대 길이만 남기고 오래된 항목을 잘라냅니다.
    pub async fn trim(&self, key: &str, max_len: usize) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("XTRIM").arg(key).arg("MAXLEN").arg(max_len).query_async(&mut conn).await?)
    }
}

fn xadd_cmd(key: &str, fields: &[(&str, &str)]) -> redis::Cmd {
    let mut cmd = redis::cmd("XADD");
    cmd.arg(key).arg("*");
    for (field, value) in fields {
        cmd.arg(*field).arg(*value);
    }
    cmd
}

fn xrange_cmd(key: &str, start: &str, end: &str, count: Option<usize>) -> redis::Cmd {
    let mut cmd = redis::cmd("XRANGE");
    cmd.arg(key).arg(start).arg(end);
    if let Some(count) = count {
        cmd.arg("COUNT").arg(count);
    }
    cmd
}

impl RedisHandler for StreamHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Stream
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
    fn test_xadd_uses_auto_id_and_field_pairs() {
        let cmd = xadd_cmd("events", &[("type", "login"), ("user", "42")]);

        assert_eq!(args(&cmd), vec!["XADD", "events", "*", "type", "login", "user", "42"]);
    }

    #[test]
    fn test_xrange_count_is_optional() {
        assert_eq!(args(&xrange_cmd("events", "-", "+", None)), vec!["XRANGE", "events", "-", "+"]);
        assert_eq!(
            args(&xrange_cmd("events", "0", "+", Some(10))),
            vec!["XRANGE", "events", "0", "+", "COUNT", "10"]
        );
    }

    #[tokio::test]
    async fn test_delete_without_ids_skips_the_server() {
        let handler = StreamHandler::new(unreachable_template());

        assert_eq!(handler.delete("events", &[]).await.unwrap(), 0);
    }
}
