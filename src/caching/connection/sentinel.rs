//! 센티널 연결
//!
//! 센티널 노드를 순서대로 돌며 `PING`에 `PONG`으로 답하는 첫 노드를 사용합니다.
//! 응답하지 않는 노드는 경고 로그만 남기고 연결을 닫은 뒤 다음 노드로 넘어갑니다.

use std::collections::HashMap;

use log::{debug, warn};
use redis::aio::MultiplexedConnection;

use super::configuration::RedisConnectionConfiguration;
use crate::core::errors::{AppError, AppResult};

/// 센티널 노드 하나에 대한 연결
pub struct RedisSentinelConnection {
    node: String,
    connection: MultiplexedConnection,
}

impl RedisSentinelConnection {
    fn new(node: String, connection: MultiplexedConnection) -> Self {
        Self { node, connection }
    }

    /// 연결된 센티널 노드 주소
    pub fn node(&self) -> &str {
        &self.node
    }

    pub async fn is_open(&self) -> bool {
        let mut connection = self.connection.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut connection)
            .await
            .is_ok()
    }

    /// `SENTINEL MASTERS`
    pub async fn masters(&self) -> AppResult<Vec<HashMap<String, String>>> {
        let mut connection = self.connection.clone();
        let masters = redis::cmd("SENTINEL")
            .arg("MASTERS")
            .query_async(&mut connection)
            .await?;
        Ok(masters)
    }

    /// `SENTINEL MASTER <name>`
    pub async fn master(&self, master_name: &str) -> AppResult<HashMap<String, String>> {
        let mut connection = self.connection.clone();
        let master = redis::cmd("SENTINEL")
            .arg("MASTER")
            .arg(master_name)
            .query_async(&mut connection)
            .await?;
        Ok(master)
    }

    /// `SENTINEL REPLICAS <name>`
    pub async fn replicas(&self, master_name: &str) -> AppResult<Vec<HashMap<String, String>>> {
        let mut connection = self.connection.clone();
        let replicas = redis::cmd("SENTINEL")
            .arg("REPLICAS")
            .arg(master_name)
            .query_async(&mut connection)
            .await?;
        Ok(replicas)
    }

    /// `SENTINEL FAILOVER <name>`
    pub async fn failover(&self, master_name: &str) -> AppResult<()> {
        let mut connection = self.connection.clone();
        redis::cmd("SENTINEL")
            .arg("FAILOVER")
            .arg(master_name)
            .query_async::<()>(&mut connection)
            .await?;
        Ok(())
    }

    /// `SENTINEL GET-MASTER-ADDR-BY-NAME <name>`
    pub async fn master_address(&self, master_name: &str) -> AppResult<(String, u16)> {
        let mut connection = self.connection.clone();
        let address: Option<(String, u16)> = redis::cmd("SENTINEL")
            .arg("GET-MASTER-ADDR-BY-NAME")
            .arg(master_name)
            .query_async(&mut connection)
            .await?;
        address.ok_or_else(|| {
            AppError::InvalidResourceUsage(format!("Master '{}' is not monitored by {}", master_name, self.node))
        })
    }
}

/// 응답하는 첫 센티널 노드에 연결합니다.
///
/// # Errors
///
/// * `InvalidResourceUsage("Redis is not in Sentinel mode")` - 센티널 설정이 아님
/// * `InvalidResourceUsage("Sentinels are not found")` - 응답하는 노드가 없음
pub(crate) async fn probe_sentinels(configuration: &RedisConnectionConfiguration) -> AppResult<RedisSentinelConnection> {
    if !configuration.is_sentinel_config() {
        return Err(AppError::InvalidResourceUsage("Redis is not in Sentinel mode".to_string()));
    }

    for node in configuration.nodes() {
        let client = match configuration
            .sentinel_connection_info(node)
            .and_then(|info| redis::Client::open(info).map_err(AppError::from))
        {
            Ok(client) => client,
            Err(e) => {
                warn!("Can't connect to {}: {}", node, e);
                continue;
            }
        };

        let mut connection = match client.get_multiplexed_async_connection().await {
            Ok(connection) => connection,
            Err(e) => {
                warn!("Can't connect to {}: {}", node, e);
                continue;
            }
        };

        match redis::cmd("PING").query_async::<String>(&mut connection).await {
            Ok(reply) if reply.eq_ignore_ascii_case("pong") => {
                debug!("센티널 노드 응답 확인: {}", node);
                return Ok(RedisSentinelConnection::new(node.clone(), connection));
            }
            Ok(reply) => warn!("Unexpected PING reply from {}: {}", node, reply),
            Err(e) => warn!("Can't connect to {}: {}", node, e),
        }
        // 실패한 연결은 여기서 drop 되어 닫힙니다
    }

    Err(AppError::InvalidResourceUsage("Sentinels are not found".to_string()))
}

/// 센티널에게 마스터 주소를 물어 데이터 노드 클라이언트를 만듭니다.
pub(crate) async fn resolve_master_client(configuration: &RedisConnectionConfiguration) -> AppResult<redis::Client> {
    let master_name = configuration
        .master_name()
        .ok_or_else(|| AppError::InvalidResourceUsage("Sentinel master name is not configured".to_string()))?;

    let sentinel = probe_sentinels(configuration).await?;
    let (host, port) = sentinel.master_address(master_name).await?;
    debug!("센티널 {} 이(가) 알려준 마스터: {}:{}", sentinel.node(), host, port);

    let info = configuration.node_connection_info(&format!("{}:{}", host, port))?;
    Ok(redis::Client::open(info)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_rejects_non_sentinel_configuration() {
        let configuration = RedisConnectionConfiguration::standalone("redis://127.0.0.1:6379");

        let result = probe_sentinels(&configuration).await;

        match result {
            Err(AppError::InvalidResourceUsage(msg)) => assert_eq!(msg, "Redis is not in Sentinel mode"),
            _ => panic!("Expected InvalidResourceUsage"),
        }
    }

    #[tokio::test]
    async fn test_probe_without_sentinel_nodes() {
        let configuration = RedisConnectionConfiguration::sentinel("mymaster", Vec::<String>::new());

        let result = probe_sentinels(&configuration).await;

        match result {
            Err(AppError::InvalidResourceUsage(msg)) => assert_eq!(msg, "Sentinels are not found"),
            _ => panic!("Expected InvalidResourceUsage"),
        }
    }

    #[tokio::test]
    async fn test_resolve_master_without_reachable_sentinel() {
        let configuration = RedisConnectionConfiguration::sentinel("mymaster", vec!["127.0.0.1:1"]);

        let result = resolve_master_client(&configuration).await;

        assert!(matches!(result, Err(AppError::InvalidResourceUsage(_))));
    }
}
