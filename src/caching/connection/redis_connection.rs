//! 표준 Redis 연결
//!
//! [`RedisConnection`]은 Spring Data Redis의 `RedisConnection`에 해당합니다.
//! 실제 TCP 연결은 첫 명령 시점에 한 번 만들어지며, 이후에는 복제본을 나눠 쓰므로
//! 여러 태스크에서 동시에 사용해도 안전합니다. 단일/센티널 모드는 `ConnectionManager`
//! 위에서 동작하므로 서버 재시작 등으로 끊어진 연결은 다음 명령에서 다시 맺어집니다.
//! 센티널 마스터 주소는 첫 연결 시점에 한 번만 조회합니다.
//!
//! 연결은 pub/sub [`Subscription`]도 소유합니다. 구독은 명령용 연결과 별개의
//! 전용 pub/sub 연결 위에서 동작합니다.

use std::sync::{Arc, RwLock};

use log::{debug, info, warn};
use redis::aio::{ConnectionLike, ConnectionManager, ConnectionManagerConfig};
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::{Cmd, Pipeline, RedisFuture, Value};
use tokio::sync::OnceCell;

use super::configuration::RedisConnectionConfiguration;
use super::sentinel;
use super::subscription::{MessageListener, Subscription};
use crate::core::errors::{AppError, AppResult};

/// 명령을 실제로 전송하는 `redis` 크레이트 연결
///
/// `redis::aio::ConnectionLike`를 구현하므로 `redis::AsyncCommands`의 모든
/// 명령을 그대로 사용할 수 있습니다.
#[derive(Clone)]
pub enum NativeConnection {
    /// 단일 노드 또는 센티널이 알려준 마스터 (자동 재연결)
    Standalone(ConnectionManager),
    Cluster(ClusterConnection),
}

impl ConnectionLike for NativeConnection {
    fn req_packed_command<'a>(&'a mut self, cmd: &'a Cmd) -> RedisFuture<'a, Value> {
        match self {
            NativeConnection::Standalone(c) => c.req_packed_command(cmd),
            NativeConnection::Cluster(c) => c.req_packed_command(cmd),
        }
    }

    fn req_packed_commands<'a>(
        &'a mut self,
        cmd: &'a Pipeline,
        offset: usize,
        count: usize,
    ) -> RedisFuture<'a, Vec<Value>> {
        match self {
            NativeConnection::Standalone(c) => c.req_packed_commands(cmd, offset, count),
            NativeConnection::Cluster(c) => c.req_packed_commands(cmd, offset, count),
        }
    }

    fn get_db(&self) -> i64 {
        match self {
            NativeConnection::Standalone(c) => c.get_db(),
            NativeConnection::Cluster(c) => c.get_db(),
        }
    }
}

/// 첫 접속 실패 시 재시도 횟수
const CONNECT_RETRIES: usize = 2;

/// 자동 재연결 연결을 만듭니다. 첫 접속은 [`CONNECT_RETRIES`]번까지 재시도합니다.
pub(crate) async fn connection_manager(client: redis::Client) -> AppResult<ConnectionManager> {
    let config = ConnectionManagerConfig::new().set_number_of_retries(CONNECT_RETRIES);
    Ok(ConnectionManager::new_with_config(client, config).await?)
}

/// 연결을 만들어낼 클라이언트
#[derive(Clone)]
pub(crate) enum ClientSource {
    Standalone(redis::Client),
    Cluster(ClusterClient),
    /// 마스터 주소는 연결 시점에 센티널에게 묻습니다.
    Sentinel(Arc<RedisConnectionConfiguration>),
}

impl ClientSource {
    /// 설정으로부터 클라이언트를 구성합니다. 네트워크 I/O는 하지 않습니다.
    pub(crate) fn from_configuration(configuration: &RedisConnectionConfiguration) -> AppResult<Self> {
        if configuration.is_cluster_config() {
            let nodes = configuration
                .nodes()
                .iter()
                .map(|node| configuration.node_connection_info(node))
                .collect::<AppResult<Vec<_>>>()?;
            return Ok(ClientSource::Cluster(ClusterClient::new(nodes)?));
        }

        if configuration.is_sentinel_config() {
            return Ok(ClientSource::Sentinel(Arc::new(configuration.clone())));
        }

        let node = configuration.nodes().first().ok_or_else(|| {
            AppError::InvalidResourceUsage("No Redis node configured".to_string())
        })?;
        let info = configuration.node_connection_info(node)?;
        Ok(ClientSource::Standalone(redis::Client::open(info)?))
    }

    /// 단일 노드(또는 센티널이 알려준 마스터) 클라이언트를 반환합니다.
    pub(crate) async fn data_client(&self) -> AppResult<redis::Client> {
        match self {
            ClientSource::Standalone(client) => Ok(client.clone()),
            ClientSource::Sentinel(configuration) => sentinel::resolve_master_client(configuration).await,
            ClientSource::Cluster(_) => Err(AppError::InvalidResourceUsage(
                "Operation is not supported in Cluster mode".to_string(),
            )),
        }
    }

    async fn connect(&self) -> AppResult<NativeConnection> {
        match self {
            ClientSource::Cluster(client) => {
                let connection = client.get_async_connection().await?;
                Ok(NativeConnection::Cluster(connection))
            }
            _ => {
                let client = self.data_client().await?;
                let manager = connection_manager(client).await?;
                Ok(NativeConnection::Standalone(manager))
            }
        }
    }
}

/// 표준 Redis 연결
pub struct RedisConnection {
    source: ClientSource,
    native: OnceCell<NativeConnection>,
    subscription: RwLock<Option<Arc<Subscription>>>,
}

impl RedisConnection {
    pub(crate) fn new(source: ClientSource) -> Self {
        Self {
            source,
            native: OnceCell::new(),
            subscription: RwLock::new(None),
        }
    }

    /// 명령 전송용 연결을 반환합니다. 처음 호출될 때 연결을 맺습니다.
    ///
    /// 첫 접속에 실패하면 아무것도 보관하지 않으므로 다음 호출에서 다시 시도합니다.
    pub async fn native(&self) -> AppResult<NativeConnection> {
        let connection = self
            .native
            .get_or_try_init(|| async {
                let connection = self.source.connect().await?;
                debug!("Redis 연결 생성 완료 (db: {})", connection.get_db());
                Ok::<_, AppError>(connection)
            })
            .await?;
        Ok(connection.clone())
    }

    pub async fn ping(&self) -> AppResult<String> {
        let mut connection = self.native().await?;
        let pong: String = redis::cmd("PING").query_async(&mut connection).await?;
        Ok(pong)
    }

    /// 현재 구독 기록을 반환합니다. 구독한 적이 없으면 `None`.
    pub fn get_subscription(&self) -> Option<Arc<Subscription>> {
        self.subscription.read().ok().and_then(|s| s.clone())
    }

    /// 살아 있는 구독이 있는지 확인합니다.
    pub fn is_subscribed(&self) -> bool {
        self.get_subscription().map(|s| s.is_alive()).unwrap_or(false)
    }

    /// 채널을 구독하고 리스너를 연결합니다.
    ///
    /// # Errors
    ///
    /// * `InvalidResourceUsage` - 채널 목록이 비었거나, 이미 구독 중이거나, 클러스터 모드인 경우
    /// * `Redis` - pub/sub 연결 또는 SUBSCRIBE 실패
    pub async fn subscribe(&self, listener: Arc<dyn MessageListener>, channels: Vec<Vec<u8>>) -> AppResult<()> {
        if channels.is_empty() {
            return Err(AppError::InvalidResourceUsage("At least one channel is required".to_string()));
        }
        let subscription = self.open_subscription(listener).await?;
        self.activate(subscription, channels, false).await
    }

    /// 패턴을 구독하고 리스너를 연결합니다.
    pub async fn p_subscribe(&self, listener: Arc<dyn MessageListener>, patterns: Vec<Vec<u8>>) -> AppResult<()> {
        if patterns.is_empty() {
            return Err(AppError::InvalidResourceUsage("At least one pattern is required".to_string()));
        }
        let subscription = self.open_subscription(listener).await?;
        self.activate(subscription, patterns, true).await
    }

    async fn open_subscription(&self, listener: Arc<dyn MessageListener>) -> AppResult<Arc<Subscription>> {
        if self.is_subscribed() {
            return Err(AppError::InvalidResourceUsage("Connection already subscribed".to_string()));
        }

        let client = self.source.data_client().await?;
        let pubsub = client.get_async_pubsub().await?;
        Ok(Arc::new(Subscription::spawn(pubsub, listener)))
    }

    /// 첫 구독 명령을 보내고, 성공한 경우에만 연결에 구독을 등록합니다.
    ///
    /// 실패하면 구독을 닫고 수신 태스크를 중단한 뒤 에러를 돌려줍니다.
    pub(crate) async fn activate(
        &self,
        subscription: Arc<Subscription>,
        names: Vec<Vec<u8>>,
        pattern: bool,
    ) -> AppResult<()> {
        let result = if pattern {
            subscription.p_subscribe(names).await
        } else {
            subscription.subscribe(names).await
        };
        if let Err(e) = result {
            warn!("첫 구독 명령 실패, 구독 연결을 닫습니다: {}", e);
            subscription.close().await?;
            return Err(e);
        }

        if !self.store_subscription(Arc::clone(&subscription)) {
            subscription.close().await?;
            return Err(AppError::InvalidResourceUsage("Connection already subscribed".to_string()));
        }
        info!("Pub/Sub 구독 연결 생성");
        Ok(())
    }

    /// 살아 있는 구독이 없을 때만 등록합니다.
    fn store_subscription(&self, subscription: Arc<Subscription>) -> bool {
        match self.subscription.write() {
            Ok(mut slot) => {
                if slot.as_ref().is_some_and(|current| current.is_alive()) {
                    return false;
                }
                *slot = Some(subscription);
                true
            }
            Err(_) => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn attach_subscription(&self, subscription: Arc<Subscription>) {
        if let Ok(mut slot) = self.subscription.write() {
            *slot = Some(subscription);
        }
    }

    /// 구독을 닫습니다. 명령용 연결은 마지막 복제본이 해제될 때 닫힙니다.
    pub async fn close(&self) -> AppResult<()> {
        let subscription = self.subscription.write().ok().and_then(|mut s| s.take());
        if let Some(subscription) = subscription {
            subscription.close().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::connection::subscription::tests::{FailingSink, RecordingSink};
    use crate::caching::connection::Message;

    fn unreachable_connection() -> RedisConnection {
        let configuration = RedisConnectionConfiguration::standalone("redis://127.0.0.1:1");
        RedisConnection::new(ClientSource::from_configuration(&configuration).unwrap())
    }

    fn channels(items: &[&str]) -> Vec<Vec<u8>> {
        items.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    #[tokio::test]
    async fn test_failed_first_subscribe_is_not_kept() {
        let connection = unreachable_connection();
        let subscription = Arc::new(Subscription::new(Box::new(FailingSink)));
        let listener: Arc<dyn MessageListener> = Arc::new(|_: &Message, _: Option<&[u8]>| {});
        subscription.attach_stream(futures_util::stream::pending::<redis::Msg>(), listener);

        let result = connection.activate(Arc::clone(&subscription), channels(&["news"]), false).await;

        assert!(matches!(result, Err(AppError::Redis(_))));
        assert!(!subscription.is_alive());
        assert!(!subscription.has_listener());
        assert!(connection.get_subscription().is_none());
        assert!(!connection.is_subscribed());
    }

    #[tokio::test]
    async fn test_subscribe_after_failed_attempt_is_accepted() {
        let connection = unreachable_connection();
        let failed = Arc::new(Subscription::new(Box::new(FailingSink)));
        assert!(connection.activate(failed, channels(&["news"]), true).await.is_err());

        let sink = RecordingSink::default();
        let subscription = Arc::new(Subscription::new(Box::new(sink.clone())));
        connection.activate(subscription, channels(&["news.*"]), true).await.unwrap();

        assert!(connection.is_subscribed());
        assert_eq!(sink.commands(), vec![("PSUBSCRIBE".to_string(), channels(&["news.*"]))]);
    }

    #[tokio::test]
    async fn test_second_activation_does_not_replace_live_subscription() {
        let connection = unreachable_connection();
        let first = Arc::new(Subscription::new(Box::new(RecordingSink::default())));
        connection.activate(Arc::clone(&first), channels(&["a"]), false).await.unwrap();

        let second = Arc::new(Subscription::new(Box::new(RecordingSink::default())));
        let result = connection.activate(Arc::clone(&second), channels(&["b"]), false).await;

        assert!(matches!(result, Err(AppError::InvalidResourceUsage(_))));
        assert!(!second.is_alive());
        assert_eq!(connection.get_subscription().unwrap().get_channels(), channels(&["a"]));
    }

    #[tokio::test]
    async fn test_empty_names_are_rejected() {
        let connection = unreachable_connection();
        let listener: Arc<dyn MessageListener> = Arc::new(|_: &Message, _: Option<&[u8]>| {});

        let by_channel = connection.subscribe(Arc::clone(&listener), Vec::new()).await;
        let by_pattern = connection.p_subscribe(listener, Vec::new()).await;

        assert!(matches!(by_channel, Err(AppError::InvalidResourceUsage(_))));
        assert!(matches!(by_pattern, Err(AppError::InvalidResourceUsage(_))));
        assert!(connection.get_subscription().is_none());
    }

    #[test]
    fn test_source_from_configuration() {
        let configuration = RedisConnectionConfiguration::standalone("redis://127.0.0.1:6379");
        assert!(matches!(
            ClientSource::from_configuration(&configuration),
            Ok(ClientSource::Standalone(_))
        ));

        let empty = RedisConnectionConfiguration::cluster(Vec::<String>::new());
        assert!(ClientSource::from_configuration(&empty).is_err());
    }

    #[tokio::test]
    async fn test_connection_without_subscription() {
        let configuration = RedisConnectionConfiguration::standalone("redis://127.0.0.1:1");
        let connection = RedisConnection::new(ClientSource::from_configuration(&configuration).unwrap());

        assert!(connection.get_subscription().is_none());
        assert!(!connection.is_subscribed());
        assert!(connection.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_connect_is_retried_on_next_call() {
        let connection = unreachable_connection();

        assert!(connection.native().await.is_err());
        assert!(connection.native.get().is_none());
        assert!(connection.ping().await.is_err());
        assert!(connection.native.get().is_none());
    }

    #[tokio::test]
    async fn test_cluster_source_has_no_data_client() {
        let configuration = RedisConnectionConfiguration::cluster(vec!["127.0.0.1:7000"]);
        let source = ClientSource::from_configuration(&configuration).unwrap();

        let result = source.data_client().await;

        assert!(matches!(result, Err(AppError::InvalidResourceUsage(_))));
    }
}
