//! 데이터베이스 핸들러

use std::collections::HashMap;
use std::sync::Arc;

use super::RedisHandler;
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct DbHandler {
    template: Arc<RedisTemplate>,
}

impl DbHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        Self { template }
    }

    /// 현재 데이터베이스의 키 개수 (`DBSIZE`)
    pub async fn db_size(&self) -> AppResult<i64> {
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("DBSIZE").query_async(&mut conn).await?)
    }

    /// 현재 데이터베이스를 비웁니다 (`FLUSHDB`)
    pub async fn flush_db(&self) -> AppResult<()> {
        let mut conn = self.template.connection().await?;
        redis::cmd("FLUSHDB").query_async::<()>(&mut conn).await?;
        Ok(())
    }

    pub async fn ping(&self) -> AppResult<String> {
        let mut conn = self.template.connection().await?;
        Ok(redis::cmd("PING").query_async(&mut conn).await?)
    }

    /// `INFO [section]` 결과를 `key -> value` 맵으로 파싱합니다.
    pub async fn info(&self, section: Option<&str>) -> AppResult<HashMap<String, String>> {
        let mut conn = self.template.connection().await?;
        let mut cmd = redis::cmd("INFO");
        if let Some(section) = section {
            cmd.arg(section);
        }
        let raw: String = cmd.query_async(&mut conn).await?;
        Ok(parse_info(&raw))
    }
}

impl RedisHandler for DbHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::Db
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}

fn parse_info(raw: &str) -> HashMap<String, String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_skips_sections_and_blank_lines() {
        let raw = "# Server\r\nredis_version:7.2.4\r\n\r\n# Clients\r\nconnected_clients:3\r\n";

        let info = parse_info(raw);

        assert_eq!(info.len(), 2);
        assert_eq!(info.get("redis_version").map(String::as_str), Some("7.2.4"));
        assert_eq!(info.get("connected_clients").map(String::as_str), Some("3"));
    }
}
