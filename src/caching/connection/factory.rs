//! # Redis 연결 팩토리
//!
//! 하나의 [`RedisConnectionConfiguration`]으로부터 표준, 클러스터, 센티널,
//! 리액티브 연결을 만들어 주는 어댑터입니다. Spring Data Redis의
//! `RedisConnectionFactory` + `ReactiveRedisConnectionFactory` 역할을 합니다.
//!
//! ## 연결 종류
//!
//! | 메서드 | 반환 타입 | 조건 |
//! |--------|-----------|------|
//! | `get_connection` | [`RedisConnection`] | 모든 모드 |
//! | `get_cluster_connection` | [`RedisClusterConnection`] | 클러스터 모드 |
//! | `get_sentinel_connection` | [`RedisSentinelConnection`] | 센티널 모드 |
//! | `get_reactive_connection` | [`ReactiveRedisConnection`] | 단일/센티널 모드 |
//! | `get_reactive_cluster_connection` | [`ReactiveRedisClusterConnection`] | 클러스터 모드 |
//!
//! ## 에러 변환
//!
//! `redis` 크레이트의 에러는 [`RedisConnectionFactory::translate_exception_if_possible`]
//! 를 통해 의미 변경 없이 [`AppError::Redis`]로 감싸집니다.

use log::info;

use super::cluster::RedisClusterConnection;
use super::configuration::RedisConnectionConfiguration;
use super::reactive::{ReactiveRedisClusterConnection, ReactiveRedisConnection};
use super::redis_connection::{connection_manager, ClientSource, RedisConnection};
use super::sentinel::{self, RedisSentinelConnection};
use crate::core::errors::{AppError, AppResult};

pub struct RedisConnectionFactory {
    configuration: RedisConnectionConfiguration,
    source: ClientSource,
}

impl RedisConnectionFactory {
    /// 설정으로 팩토리를 생성합니다.
    ///
    /// 클라이언트 객체만 구성하며 서버에 접속하지는 않습니다.
    /// 잘못된 주소 형식은 여기서 바로 실패합니다.
    pub fn new(configuration: RedisConnectionConfiguration) -> AppResult<Self> {
        let source = ClientSource::from_configuration(&configuration)?;
        info!(
            "Redis 연결 팩토리 생성: {:?} 모드, 노드 {}개, db {}",
            configuration.mode(),
            configuration.nodes().len(),
            configuration.database()
        );
        Ok(Self { configuration, source })
    }

    pub fn configuration(&self) -> &RedisConnectionConfiguration {
        &self.configuration
    }

    /// 클라이언트 에러를 데이터 접근 에러로 변환합니다 (pass-through).
    pub fn translate_exception_if_possible(error: redis::RedisError) -> AppError {
        AppError::Redis(error)
    }

    /// 표준 연결을 반환합니다. 실제 접속은 첫 명령 시점에 이루어집니다.
    pub fn get_connection(&self) -> RedisConnection {
        RedisConnection::new(self.source.clone())
    }

    /// 클러스터 연결을 반환합니다.
    ///
    /// # Errors
    ///
    /// * `InvalidResourceUsage("Redis is not in Cluster mode")` - 클러스터 설정이 아님
    pub async fn get_cluster_connection(&self) -> AppResult<RedisClusterConnection> {
        let client = self.cluster_client()?;
        let connection = client.get_async_connection().await?;
        Ok(RedisClusterConnection::new(connection))
    }

    /// 응답하는 첫 센티널 노드의 연결을 반환합니다.
    ///
    /// 각 센티널에 연결해 `PING`을 보내고, 실패한 연결은 즉시 닫습니다.
    ///
    /// # Errors
    ///
    /// * `InvalidResourceUsage("Redis is not in Sentinel mode")`
    /// * `InvalidResourceUsage("Sentinels are not found")`
    pub async fn get_sentinel_connection(&self) -> AppResult<RedisSentinelConnection> {
        sentinel::probe_sentinels(&self.configuration).await
    }

    /// 자동 재연결 연결을 반환합니다.
    pub async fn get_reactive_connection(&self) -> AppResult<ReactiveRedisConnection> {
        let client = self.source.data_client().await?;
        let manager = connection_manager(client).await?;
        Ok(ReactiveRedisConnection::new(manager))
    }

    /// 클러스터 리액티브 연결을 반환합니다.
    pub async fn get_reactive_cluster_connection(&self) -> AppResult<ReactiveRedisClusterConnection> {
        let client = self.cluster_client()?;
        let connection = client.get_async_connection().await?;
        Ok(ReactiveRedisClusterConnection::new(connection))
    }

    /// 파이프라인/트랜잭션 결과를 항상 변환합니다.
    pub fn get_convert_pipeline_and_tx_results(&self) -> bool {
        true
    }

    pub fn get_database(&self) -> i64 {
        self.configuration.database()
    }

    /// 데이터베이스 인덱스를 바꾸고 클라이언트를 다시 구성합니다.
    ///
    /// # Errors
    ///
    /// * `InvalidResourceUsage` - 음수 인덱스
    pub fn set_database(&mut self, index: i64) -> AppResult<()> {
        let mut configuration = self.configuration.clone();
        configuration.set_database(index)?;
        self.source = ClientSource::from_configuration(&configuration)?;
        self.configuration = configuration;
        Ok(())
    }

    /// 다른 데이터베이스를 가리키는 새 팩토리를 만듭니다.
    pub fn with_database(&self, index: i64) -> AppResult<Self> {
        let configuration = self.configuration.clone().with_database(index)?;
        Self::new(configuration)
    }

    fn cluster_client(&self) -> AppResult<&redis::cluster::ClusterClient> {
        match &self.source {
            ClientSource::Cluster(client) => Ok(client),
            _ => Err(AppError::InvalidResourceUsage("Redis is not in Cluster mode".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standalone() -> RedisConnectionFactory {
        RedisConnectionFactory::new(RedisConnectionConfiguration::standalone("redis://127.0.0.1:1")).unwrap()
    }

    fn expect_invalid_usage<T>(result: AppResult<T>, expected: &str) {
        match result {
            Err(AppError::InvalidResourceUsage(msg)) => assert_eq!(msg, expected),
            Err(other) => panic!("Expected InvalidResourceUsage, got {}", other),
            Ok(_) => panic!("Expected InvalidResourceUsage, got Ok"),
        }
    }

    #[tokio::test]
    async fn test_cluster_connection_requires_cluster_mode() {
        let factory = standalone();

        expect_invalid_usage(factory.get_cluster_connection().await, "Redis is not in Cluster mode");
        expect_invalid_usage(
            factory.get_reactive_cluster_connection().await,
            "Redis is not in Cluster mode",
        );
    }

    #[tokio::test]
    async fn test_sentinel_connection_requires_sentinel_mode() {
        let factory = standalone();

        expect_invalid_usage(factory.get_sentinel_connection().await, "Redis is not in Sentinel mode");
    }

    #[tokio::test]
    async fn test_unreachable_sentinels_are_not_found() {
        let configuration = RedisConnectionConfiguration::sentinel("mymaster", vec!["127.0.0.1:1", "127.0.0.1:2"]);
        let factory = RedisConnectionFactory::new(configuration).unwrap();

        expect_invalid_usage(factory.get_sentinel_connection().await, "Sentinels are not found");
    }

    #[test]
    fn test_set_database_validates_index() {
        let mut factory = standalone();

        assert!(factory.set_database(-3).is_err());
        assert_eq!(factory.get_database(), 0);

        factory.set_database(4).unwrap();
        assert_eq!(factory.get_database(), 4);
        assert!(factory.get_convert_pipeline_and_tx_results());
    }

    #[test]
    fn test_with_database_leaves_original_untouched() {
        let factory = standalone();

        let other = factory.with_database(7).unwrap();

        assert_eq!(factory.get_database(), 0);
        assert_eq!(other.get_database(), 7);
    }

    #[test]
    fn test_translation_keeps_original_error() {
        let original = redis::RedisError::from((redis::ErrorKind::IoError, "connection refused"));

        let translated = RedisConnectionFactory::translate_exception_if_possible(original);

        assert_eq!(translated.as_redis_error().map(|e| e.kind()), Some(redis::ErrorKind::IoError));
    }

    #[test]
    fn test_get_connection_does_not_connect() {
        let factory = standalone();

        let connection = factory.get_connection();

        assert!(!connection.is_subscribed());
    }
}
