//! Pub/Sub 핸들러
//!
//! 발행은 템플릿의 공유 연결로 보내고, 구독은 핸들러가 소유한 전용
//! [`RedisConnection`]의 [`Subscription`](crate::caching::connection::Subscription)에
//! 위임합니다.
//!
//! 살아 있는 구독이 없을 때 채널 추가나 해제 요청은 조용히 무시됩니다.
//!
//! ```rust,ignore
//! let handler = manager.get_pub_sub_handler(0)?;
//! handler
//!     .subscribe(|message: &Message, _: Option<&[u8]>| info!("{}", message.channel_name()), &["news"])
//!     .await?;
//! handler.add_sub_channels(&["sports"]).await?;
//! handler.publish("news", &json!({"title": "hello"})).await?;
//! ```

use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RedisHandler;
use crate::caching::connection::{MessageListener, RedisConnection, Subscription};
use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;
use crate::core::errors::AppResult;

pub struct PubSubHandler {
    template: Arc<RedisTemplate>,
    connection: RedisConnection,
}

impl PubSubHandler {
    pub fn new(template: Arc<RedisTemplate>) -> Self {
        let connection = template.get_required_connection_factory().get_connection();
        Self { template, connection }
    }

    /// 메시지를 JSON으로 직렬화해 발행합니다. 수신한 구독자 수를 반환합니다.
    pub async fn publish<T: Serialize + ?Sized>(&self, channel: &str, message: &T) -> AppResult<i64> {
        self.template.convert_and_send(channel, message).await
    }

    /// 채널을 구독합니다.
    ///
    /// # Errors
    ///
    /// * `InvalidResourceUsage` - 이미 살아 있는 구독이 있는 경우
    ///   (채널 추가는 [`add_sub_channels`](Self::add_sub_channels) 사용)
    pub async fn subscribe<L>(&self, listener: L, channels: &[&str]) -> AppResult<()>
    where
        L: MessageListener,
    {
        self.connection.subscribe(Arc::new(listener), to_bytes(channels)).await
    }

    /// 패턴을 구독합니다.
    pub async fn p_subscribe<L>(&self, listener: L, patterns: &[&str]) -> AppResult<()>
    where
        L: MessageListener,
    {
        self.connection.p_subscribe(Arc::new(listener), to_bytes(patterns)).await
    }

    pub async fn add_sub_channels(&self, channels: &[&str]) -> AppResult<()> {
        match self.live_subscription("add_sub_channels") {
            Some(subscription) => subscription.subscribe(to_bytes(channels)).await,
            None => Ok(()),
        }
    }

    pub async fn add_p_sub_channels(&self, patterns: &[&str]) -> AppResult<()> {
        match self.live_subscription("add_p_sub_channels") {
            Some(subscription) => subscription.p_subscribe(to_bytes(patterns)).await,
            None => Ok(()),
        }
    }

    /// 채널 구독을 해제합니다. 빈 목록이면 모든 채널을 해제합니다.
    pub async fn unsubscribe(&self, channels: &[&str]) -> AppResult<()> {
        match self.live_subscription("unsubscribe") {
            Some(subscription) => subscription.unsubscribe(to_bytes(channels)).await,
            None => Ok(()),
        }
    }

    /// 패턴 구독을 해제합니다. 빈 목록이면 모든 패턴을 해제합니다.
    pub async fn p_unsubscribe(&self, patterns: &[&str]) -> AppResult<()> {
        match self.live_subscription("p_unsubscribe") {
            Some(subscription) => subscription.p_unsubscribe(to_bytes(patterns)).await,
            None => Ok(()),
        }
    }

    pub fn get_channels(&self) -> Vec<String> {
        self.live_subscription("get_channels")
            .map(|subscription| to_strings(subscription.get_channels()))
            .unwrap_or_default()
    }

    pub fn get_patterns(&self) -> Vec<String> {
        self.live_subscription("get_patterns")
            .map(|subscription| to_strings(subscription.get_patterns()))
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self) -> bool {
        self.connection.is_subscribed()
    }

    /// 메시지 본문을 템플릿의 직렬화 방식으로 역직렬화합니다.
    pub fn deserialize<T: DeserializeOwned>(&self, body: &[u8]) -> AppResult<T> {
        self.template.deserialize(body)
    }

    pub fn connection(&self) -> &RedisConnection {
        &self.connection
    }

    /// 구독을 닫습니다.
    pub async fn close(&self) -> AppResult<()> {
        self.connection.close().await
    }

    fn live_subscription(&self, operation: &str) -> Option<Arc<Subscription>> {
        match self.connection.get_subscription() {
            Some(subscription) if subscription.is_alive() => Some(subscription),
            _ => {
                debug!("살아 있는 구독이 없어 {}를 건너뜁니다", operation);
                None
            }
        }
    }
}

impl RedisHandler for PubSubHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::PubSub
    }

    fn redis_template(&self) -> &Arc<RedisTemplate> {
        &self.template
    }
}

fn to_bytes(names: &[&str]) -> Vec<Vec<u8>> {
    names.iter().map(|name| name.as_bytes().to_vec()).collect()
}

fn to_strings(raw: Vec<Vec<u8>>) -> Vec<String> {
    raw.iter()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::connection::subscription::tests::RecordingSink;
    use crate::caching::connection::{Message, RedisConnectionConfiguration, RedisConnectionFactory};
    use crate::core::errors::AppError;

    fn handler() -> PubSubHandler {
        let configuration = RedisConnectionConfiguration::standalone("redis://127.0.0.1:1");
        let factory = RedisConnectionFactory::new(configuration).unwrap();
        PubSubHandler::new(Arc::new(RedisTemplate::new(Arc::new(factory))))
    }

    fn attach(handler: &PubSubHandler) -> RecordingSink {
        let sink = RecordingSink::default();
        let subscription = Arc::new(Subscription::new(Box::new(sink.clone())));
        handler.connection().attach_subscription(subscription);
        sink
    }

    #[tokio::test]
    async fn test_mutations_without_subscription_are_noops() {
        let handler = handler();

        assert!(handler.add_sub_channels(&["news"]).await.is_ok());
        assert!(handler.add_p_sub_channels(&["news.*"]).await.is_ok());
        assert!(handler.unsubscribe(&[]).await.is_ok());
        assert!(handler.p_unsubscribe(&["news.*"]).await.is_ok());
        assert!(handler.get_channels().is_empty());
        assert!(handler.get_patterns().is_empty());
        assert!(!handler.is_subscribed());
    }

    #[tokio::test]
    async fn test_add_and_remove_channels() {
        let handler = handler();
        let sink = attach(&handler);

        handler.add_sub_channels(&["news", "sports"]).await.unwrap();
        handler.add_p_sub_channels(&["alerts.*"]).await.unwrap();
        handler.unsubscribe(&["sports"]).await.unwrap();

        assert_eq!(handler.get_channels(), vec!["news".to_string()]);
        assert_eq!(handler.get_patterns(), vec!["alerts.*".to_string()]);
        assert_eq!(sink.commands()[0].0, "SUBSCRIBE");
        assert_eq!(sink.commands()[2], ("UNSUBSCRIBE".to_string(), vec![b"sports".to_vec()]));
    }

    #[tokio::test]
    async fn test_removing_everything_closes_subscription() {
        let handler = handler();
        attach(&handler);
        handler.add_sub_channels(&["news"]).await.unwrap();
        handler.add_p_sub_channels(&["alerts.*"]).await.unwrap();

        handler.unsubscribe(&[]).await.unwrap();
        assert!(handler.is_subscribed());

        handler.p_unsubscribe(&[]).await.unwrap();
        assert!(!handler.is_subscribed());
        assert!(handler.get_channels().is_empty());
        assert!(handler.get_patterns().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_while_live_is_rejected() {
        let handler = handler();
        attach(&handler);

        let listener = |_: &Message, _: Option<&[u8]>| {};
        let result = handler.subscribe(listener, &["news"]).await;

        match result {
            Err(AppError::InvalidResourceUsage(message)) => {
                assert_eq!(message, "Connection already subscribed")
            }
            _ => panic!("expected InvalidResourceUsage"),
        }
    }

    #[tokio::test]
    async fn test_channel_names_are_decoded_lossily() {
        let handler = handler();
        attach(&handler);
        let subscription = handler.connection().get_subscription().unwrap();
        subscription.subscribe(vec![vec![0x66, 0x6f, 0xff]]).await.unwrap();

        assert_eq!(handler.get_channels(), vec!["fo\u{FFFD}".to_string()]);
    }

    #[test]
    fn test_deserialize_message_body() {
        let handler = handler();

        let value: serde_json::Value = handler.deserialize(br#"{"title":"hello"}"#).unwrap();

        assert_eq!(value["title"], "hello");
        assert_eq!(handler.handler_type(), HandlerType::PubSub);
    }
}
