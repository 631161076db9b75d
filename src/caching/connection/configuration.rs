//! Redis 연결 설정
//!
//! Spring Data Redis의 `RedisStandaloneConfiguration`, `RedisClusterConfiguration`,
//! `RedisSentinelConfiguration`을 하나의 타입으로 묶은 것입니다.
//! 실제 클라이언트 생성은 [`RedisConnectionFactory`](super::RedisConnectionFactory)가
//! 담당하며, 이 모듈은 노드 주소와 인증 정보를 `redis::ConnectionInfo`로
//! 변환하는 일만 합니다.

use redis::{ConnectionInfo, IntoConnectionInfo};

use crate::core::errors::{AppError, AppResult};

/// Redis 배포 형태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedisMode {
    /// 단일 노드
    Standalone,
    /// Redis Cluster
    Cluster,
    /// Redis Sentinel 기반 마스터/레플리카
    Sentinel,
}

impl RedisMode {
    /// 문자열에서 모드를 생성합니다. 알 수 없는 값은 `Standalone`.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cluster" => RedisMode::Cluster,
            "sentinel" => RedisMode::Sentinel,
            _ => RedisMode::Standalone,
        }
    }
}

/// Redis 연결 설정
#[derive(Debug, Clone)]
pub struct RedisConnectionConfiguration {
    mode: RedisMode,
    /// standalone: 서버 주소 1개, cluster: 시드 노드들, sentinel: 센티널 노드들
    nodes: Vec<String>,
    master_name: Option<String>,
    username: Option<String>,
    password: Option<String>,
    sentinel_password: Option<String>,
    /// 명시적으로 지정된 인덱스. 없으면 단일 노드 URL의 `/<db>`를 따릅니다.
    database: Option<i64>,
}

impl RedisConnectionConfiguration {
    /// 단일 노드 설정을 생성합니다.
    ///
    /// ```rust,ignore
    /// let config = RedisConnectionConfiguration::standalone("redis://localhost:6379");
    /// ```
    pub fn standalone(url: impl Into<String>) -> Self {
        Self::new(RedisMode::Standalone, vec![url.into()], None)
    }

    /// 클러스터 설정을 생성합니다.
    pub fn cluster<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(RedisMode::Cluster, nodes.into_iter().map(Into::into).collect(), None)
    }

    /// 센티널 설정을 생성합니다.
    ///
    /// # Arguments
    ///
    /// * `master_name` - 센티널이 감시하는 마스터 이름 (예: `mymaster`)
    /// * `sentinels` - 센티널 노드 주소 목록
    pub fn sentinel<I, S>(master_name: impl Into<String>, sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            RedisMode::Sentinel,
            sentinels.into_iter().map(Into::into).collect(),
            Some(master_name.into()),
        )
    }

    fn new(mode: RedisMode, nodes: Vec<String>, master_name: Option<String>) -> Self {
        Self {
            mode,
            nodes,
            master_name,
            username: None,
            password: None,
            sentinel_password: None,
            database: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_sentinel_password(mut self, password: impl Into<String>) -> Self {
        self.sentinel_password = Some(password.into());
        self
    }

    /// 데이터베이스 인덱스를 지정한 복사본을 반환합니다.
    pub fn with_database(mut self, index: i64) -> AppResult<Self> {
        self.set_database(index)?;
        Ok(self)
    }

    pub fn mode(&self) -> RedisMode {
        self.mode
    }

    pub fn is_cluster_config(&self) -> bool {
        self.mode == RedisMode::Cluster
    }

    pub fn is_sentinel_config(&self) -> bool {
        self.mode == RedisMode::Sentinel
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn master_name(&self) -> Option<&str> {
        self.master_name.as_deref()
    }

    /// 사용할 데이터베이스 인덱스
    ///
    /// 명시한 값이 우선이며, 없으면 단일 노드 URL에 적힌 값(없으면 0)을 사용합니다.
    /// 클러스터는 항상 0입니다.
    pub fn database(&self) -> i64 {
        if self.is_cluster_config() {
            return 0;
        }
        self.database.unwrap_or_else(|| self.url_database())
    }

    fn url_database(&self) -> i64 {
        if self.mode != RedisMode::Standalone {
            return 0;
        }
        self.nodes
            .first()
            .and_then(|node| normalize_address(node).into_connection_info().ok())
            .map(|info| info.redis.db)
            .unwrap_or(0)
    }

    /// 데이터베이스 인덱스를 변경합니다.
    ///
    /// # Errors
    ///
    /// * `InvalidResourceUsage` - 음수 인덱스
    pub fn set_database(&mut self, index: i64) -> AppResult<()> {
        if index < 0 {
            return Err(AppError::InvalidResourceUsage(
                "invalid DB index (a positive index required)".to_string(),
            ));
        }
        self.database = Some(index);
        Ok(())
    }

    /// 데이터 노드 접속 정보를 만듭니다. 데이터베이스와 인증 정보가 적용됩니다.
    pub fn node_connection_info(&self, node: &str) -> AppResult<ConnectionInfo> {
        let mut info = normalize_address(node).into_connection_info()?;
        // 클러스터는 0번 데이터베이스만 지원
        if self.is_cluster_config() {
            info.redis.db = 0;
        } else if let Some(database) = self.database {
            info.redis.db = database;
        }
        if self.username.is_some() {
            info.redis.username = self.username.clone();
        }
        if self.password.is_some() {
            info.redis.password = self.password.clone();
        }
        Ok(info)
    }

    /// 센티널 노드 접속 정보를 만듭니다.
    pub fn sentinel_connection_info(&self, node: &str) -> AppResult<ConnectionInfo> {
        let mut info = normalize_address(node).into_connection_info()?;
        info.redis.db = 0;
        if self.sentinel_password.is_some() {
            info.redis.password = self.sentinel_password.clone();
        }
        Ok(info)
    }
}

/// `host:port` 형태의 주소에 `redis://` 스킴을 붙입니다.
fn normalize_address(node: &str) -> String {
    let node = node.trim();
    if node.contains("://") {
        node.to_string()
    } else {
        format!("redis://{}", node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_string() {
        assert_eq!(RedisMode::from_str("cluster"), RedisMode::Cluster);
        assert_eq!(RedisMode::from_str(" Sentinel "), RedisMode::Sentinel);
        assert_eq!(RedisMode::from_str("standalone"), RedisMode::Standalone);
        assert_eq!(RedisMode::from_str("whatever"), RedisMode::Standalone);
    }

    #[test]
    fn test_negative_database_is_rejected() {
        let mut config = RedisConnectionConfiguration::standalone("redis://localhost:6379");

        let result = config.set_database(-1);

        assert!(matches!(result, Err(AppError::InvalidResourceUsage(_))));
        assert_eq!(config.database(), 0);
    }

    #[test]
    fn test_node_connection_info_applies_database_and_password() {
        let config = RedisConnectionConfiguration::standalone("localhost:6380")
            .with_password("secret")
            .with_database(3)
            .unwrap();

        let info = config.node_connection_info("localhost:6380").unwrap();

        assert_eq!(info.redis.db, 3);
        assert_eq!(info.redis.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_url_database_is_used_when_not_set() {
        let config = RedisConnectionConfiguration::standalone("redis://localhost:6379/5");

        let info = config.node_connection_info("redis://localhost:6379/5").unwrap();

        assert_eq!(config.database(), 5);
        assert_eq!(info.redis.db, 5);
    }

    #[test]
    fn test_explicit_database_overrides_url() {
        let config = RedisConnectionConfiguration::standalone("redis://localhost:6379/5")
            .with_database(2)
            .unwrap();

        let info = config.node_connection_info("redis://localhost:6379/5").unwrap();

        assert_eq!(config.database(), 2);
        assert_eq!(info.redis.db, 2);
    }

    #[test]
    fn test_cluster_nodes_always_use_database_zero() {
        let config = RedisConnectionConfiguration::cluster(vec!["127.0.0.1:7000", "127.0.0.1:7001"])
            .with_database(5)
            .unwrap();

        let info = config.node_connection_info("127.0.0.1:7000").unwrap();

        assert!(config.is_cluster_config());
        assert_eq!(config.nodes().len(), 2);
        assert_eq!(info.redis.db, 0);
    }

    #[test]
    fn test_sentinel_info_ignores_data_credentials() {
        let config = RedisConnectionConfiguration::sentinel("mymaster", vec!["127.0.0.1:26379"])
            .with_password("data-secret")
            .with_database(2)
            .unwrap();

        let info = config.sentinel_connection_info("127.0.0.1:26379").unwrap();

        assert!(config.is_sentinel_config());
        assert_eq!(config.master_name(), Some("mymaster"));
        assert_eq!(info.redis.db, 0);
        assert_eq!(info.redis.password, None);
    }
}
