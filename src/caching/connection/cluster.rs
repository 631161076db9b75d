//! 클러스터 전용 연결
//!
//! 토폴로지 탐색과 슬롯 라우팅은 `redis::cluster_async`가 처리합니다.
//! 여기서는 클러스터 관리 명령만 노출합니다.

use redis::cluster_async::ClusterConnection;

use super::redis_connection::NativeConnection;
use crate::core::errors::AppResult;

pub struct RedisClusterConnection {
    connection: ClusterConnection,
}

impl RedisClusterConnection {
    pub(crate) fn new(connection: ClusterConnection) -> Self {
        Self { connection }
    }

    /// 일반 명령용 연결로 변환합니다.
    pub fn native(&self) -> NativeConnection {
        NativeConnection::Cluster(self.connection.clone())
    }

    pub async fn ping(&self) -> AppResult<String> {
        let mut connection = self.connection.clone();
        let pong: String = redis::cmd("PING").query_async(&mut connection).await?;
        Ok(pong)
    }

    /// `CLUSTER INFO`
    pub async fn cluster_info(&self) -> AppResult<String> {
        let mut connection = self.connection.clone();
        let info: String = redis::cmd("CLUSTER").arg("INFO").query_async(&mut connection).await?;
        Ok(info)
    }

    /// `CLUSTER NODES`
    pub async fn cluster_nodes(&self) -> AppResult<String> {
        let mut connection = self.connection.clone();
        let nodes: String = redis::cmd("CLUSTER").arg("NODES").query_async(&mut connection).await?;
        Ok(nodes)
    }

    /// `CLUSTER KEYSLOT <key>`
    pub async fn key_slot(&self, key: &str) -> AppResult<i64> {
        let mut connection = self.connection.clone();
        let slot: i64 = redis::cmd("CLUSTER")
            .arg("KEYSLOT")
            .arg(key)
            .query_async(&mut connection)
            .await?;
        Ok(slot)
    }

    /// `CLUSTER COUNTKEYSINSLOT <slot>`
    pub async fn count_keys_in_slot(&self, slot: i64) -> AppResult<i64> {
        let mut connection = self.connection.clone();
        let count: i64 = redis::cmd("CLUSTER")
            .arg("COUNTKEYSINSLOT")
            .arg(slot)
            .query_async(&mut connection)
            .await?;
        Ok(count)
    }
}
