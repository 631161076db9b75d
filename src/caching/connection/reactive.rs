//! 리액티브 연결
//!
//! Spring의 `ReactiveRedisConnection` 대응입니다. Rust에서는 모든 연결이 비동기이므로,
//! 여기서는 호출자가 단독으로 소유하는 자동 재연결 `ConnectionManager`를 감싸는 것으로
//! 구분합니다. 표준 연결은 하나의 관리자를 템플릿 전체가 나눠 씁니다.

use futures_util::stream::{self, Stream};
use redis::aio::ConnectionManager;
use redis::cluster_async::ClusterConnection;
use redis::{Cmd, FromRedisValue};

use crate::core::errors::AppResult;

/// 자동 재연결 단일 노드 연결
#[derive(Clone)]
pub struct ReactiveRedisConnection {
    manager: ConnectionManager,
}

impl ReactiveRedisConnection {
    pub(crate) fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    /// `redis::AsyncCommands`로 직접 사용할 수 있는 연결 복제본
    pub fn commands(&self) -> ConnectionManager {
        self.manager.clone()
    }

    pub async fn execute<T: FromRedisValue>(&self, cmd: &Cmd) -> AppResult<T> {
        let mut manager = self.manager.clone();
        Ok(cmd.query_async(&mut manager).await?)
    }

    /// 패턴에 맞는 키를 `SCAN`으로 모두 모아 스트림으로 돌려줍니다.
    pub async fn scan_keys(&self, pattern: &str) -> AppResult<impl Stream<Item = String>> {
        let mut manager = self.manager.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .query_async(&mut manager)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(stream::iter(keys))
    }
}

/// 클러스터 리액티브 연결
#[derive(Clone)]
pub struct ReactiveRedisClusterConnection {
    connection: ClusterConnection,
}

impl ReactiveRedisClusterConnection {
    pub(crate) fn new(connection: ClusterConnection) -> Self {
        Self { connection }
    }

    pub fn commands(&self) -> ClusterConnection {
        self.connection.clone()
    }

    pub async fn execute<T: FromRedisValue>(&self, cmd: &Cmd) -> AppResult<T> {
        let mut connection = self.connection.clone();
        Ok(cmd.query_async(&mut connection).await?)
    }
}
