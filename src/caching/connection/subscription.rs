//! Pub/Sub 구독 상태
//!
//! [`Subscription`]은 하나의 [`RedisConnection`](super::RedisConnection)이 소유하는
//! 구독 기록입니다. 현재 구독 중인 채널/패턴 목록과 생존 여부를 추적하며,
//! 실제 `SUBSCRIBE`/`UNSUBSCRIBE` 명령은 [`SubscriptionSink`]를 통해 전송합니다.
//!
//! 메시지 수신은 `redis` 크레이트의 pub/sub 스트림을 도는 tokio 태스크가 담당하고,
//! 채널과 패턴이 모두 비면 구독은 닫히고(alive = false) 수신 태스크도 중단됩니다.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use log::{debug, warn};
use redis::RedisResult;
use tokio::task::JoinHandle;

use crate::core::errors::AppResult;

/// 수신된 pub/sub 메시지
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    channel: Vec<u8>,
    body: Vec<u8>,
}

impl Message {
    pub fn new(channel: Vec<u8>, body: Vec<u8>) -> Self {
        Self { channel, body }
    }

    pub fn channel(&self) -> &[u8] {
        &self.channel
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// 채널 이름을 문자열로 반환합니다.
    pub fn channel_name(&self) -> String {
        String::from_utf8_lossy(&self.channel).into_owned()
    }
}

/// 메시지 리스너
///
/// 리스너는 `redis` 크레이트의 I/O가 메시지를 넘겨주는 tokio 태스크에서 호출됩니다.
/// 패턴 구독으로 받은 메시지는 `pattern`에 일치한 패턴이 전달됩니다.
pub trait MessageListener: Send + Sync + 'static {
    fn on_message(&self, message: &Message, pattern: Option<&[u8]>);
}

impl<F> MessageListener for F
where
    F: Fn(&Message, Option<&[u8]>) + Send + Sync + 'static,
{
    fn on_message(&self, message: &Message, pattern: Option<&[u8]>) {
        self(message, pattern)
    }
}

/// 구독 명령 전송 경로
///
/// 운영 환경에서는 `redis::aio::PubSubSink`가 구현하며,
/// 테스트에서는 메모리 기반 구현으로 대체할 수 있습니다.
#[async_trait]
pub trait SubscriptionSink: Send {
    async fn subscribe(&mut self, channels: Vec<Vec<u8>>) -> RedisResult<()>;
    async fn unsubscribe(&mut self, channels: Vec<Vec<u8>>) -> RedisResult<()>;
    async fn psubscribe(&mut self, patterns: Vec<Vec<u8>>) -> RedisResult<()>;
    async fn punsubscribe(&mut self, patterns: Vec<Vec<u8>>) -> RedisResult<()>;
}

#[async_trait]
impl SubscriptionSink for redis::aio::PubSubSink {
    async fn subscribe(&mut self, channels: Vec<Vec<u8>>) -> RedisResult<()> {
        redis::aio::PubSubSink::subscribe(self, channels).await
    }

    async fn unsubscribe(&mut self, channels: Vec<Vec<u8>>) -> RedisResult<()> {
        redis::aio::PubSubSink::unsubscribe(self, channels).await
    }

    async fn psubscribe(&mut self, patterns: Vec<Vec<u8>>) -> RedisResult<()> {
        redis::aio::PubSubSink::psubscribe(self, patterns).await
    }

    async fn punsubscribe(&mut self, patterns: Vec<Vec<u8>>) -> RedisResult<()> {
        redis::aio::PubSubSink::punsubscribe(self, patterns).await
    }
}

#[derive(Debug, Default)]
struct SubscriptionState {
    channels: Vec<Vec<u8>>,
    patterns: Vec<Vec<u8>>,
    alive: bool,
}

impl SubscriptionState {
    fn close_if_empty(&mut self) -> bool {
        if self.alive && self.channels.is_empty() && self.patterns.is_empty() {
            self.alive = false;
            return true;
        }
        false
    }
}

/// 연결이 소유하는 구독 기록
pub struct Subscription {
    sink: tokio::sync::Mutex<Box<dyn SubscriptionSink>>,
    state: Arc<Mutex<SubscriptionState>>,
    listener_task: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    /// 명령 전송 경로만 가진 구독을 생성합니다. 처음에는 살아 있는 상태입니다.
    pub fn new(sink: Box<dyn SubscriptionSink>) -> Self {
        Self {
            sink: tokio::sync::Mutex::new(sink),
            state: Arc::new(Mutex::new(SubscriptionState {
                alive: true,
                ..Default::default()
            })),
            listener_task: Mutex::new(None),
        }
    }

    /// `redis` 크레이트의 pub/sub 연결로 구독을 시작합니다.
    ///
    /// 스트림을 소비하는 태스크를 띄우고 메시지를 `listener`로 전달합니다.
    pub(crate) fn spawn(pubsub: redis::aio::PubSub, listener: Arc<dyn MessageListener>) -> Self {
        let (sink, stream) = pubsub.split();
        let subscription = Self::new(Box::new(sink));
        subscription.attach_stream(stream, listener);
        subscription
    }

    /// 메시지 스트림을 리스너에 연결합니다. 스트림이 끝나면 구독은 닫힙니다.
    pub(crate) fn attach_stream<S>(&self, stream: S, listener: Arc<dyn MessageListener>)
    where
        S: Stream<Item = redis::Msg> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            let mut stream = Box::pin(stream);
            while let Some(msg) = stream.next().await {
                let message = Message::new(
                    msg.get_channel_name().as_bytes().to_vec(),
                    msg.get_payload_bytes().to_vec(),
                );
                let pattern: Option<Vec<u8>> = if msg.from_pattern() {
                    msg.get_pattern::<Vec<u8>>().ok()
                } else {
                    None
                };
                listener.on_message(&message, pattern.as_deref());
            }
            debug!("Pub/Sub 스트림 종료");
            if let Ok(mut state) = state.lock() {
                state.alive = false;
            }
        });

        if let Ok(mut task) = self.listener_task.lock() {
            if let Some(previous) = task.replace(handle) {
                previous.abort();
            }
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state.lock().map(|s| s.alive).unwrap_or(false)
    }

    /// 현재 구독 중인 채널 목록 (원시 바이트)
    pub fn get_channels(&self) -> Vec<Vec<u8>> {
        self.state.lock().map(|s| s.channels.clone()).unwrap_or_default()
    }

    /// 현재 구독 중인 패턴 목록 (원시 바이트)
    pub fn get_patterns(&self) -> Vec<Vec<u8>> {
        self.state.lock().map(|s| s.patterns.clone()).unwrap_or_default()
    }

    /// 채널을 추가로 구독합니다.
    pub async fn subscribe(&self, channels: Vec<Vec<u8>>) -> AppResult<()> {
        if channels.is_empty() {
            return Ok(());
        }
        self.sink.lock().await.subscribe(channels.clone()).await?;
        self.record(|state| add_all(&mut state.channels, channels));
        Ok(())
    }

    /// 패턴을 추가로 구독합니다.
    pub async fn p_subscribe(&self, patterns: Vec<Vec<u8>>) -> AppResult<()> {
        if patterns.is_empty() {
            return Ok(());
        }
        self.sink.lock().await.psubscribe(patterns.clone()).await?;
        self.record(|state| add_all(&mut state.patterns, patterns));
        Ok(())
    }

    /// 채널 구독을 해제합니다. 빈 목록이면 모든 채널을 해제합니다.
    pub async fn unsubscribe(&self, channels: Vec<Vec<u8>>) -> AppResult<()> {
        let targets = if channels.is_empty() { self.get_channels() } else { channels };
        if targets.is_empty() {
            return Ok(());
        }
        self.sink.lock().await.unsubscribe(targets.clone()).await?;
        self.record(|state| state.channels.retain(|c| !targets.contains(c)));
        Ok(())
    }

    /// 패턴 구독을 해제합니다. 빈 목록이면 모든 패턴을 해제합니다.
    pub async fn p_unsubscribe(&self, patterns: Vec<Vec<u8>>) -> AppResult<()> {
        let targets = if patterns.is_empty() { self.get_patterns() } else { patterns };
        if targets.is_empty() {
            return Ok(());
        }
        self.sink.lock().await.punsubscribe(targets.clone()).await?;
        self.record(|state| state.patterns.retain(|p| !targets.contains(p)));
        Ok(())
    }

    /// 모든 채널과 패턴을 해제하고 구독을 닫습니다.
    pub async fn close(&self) -> AppResult<()> {
        if !self.is_alive() {
            return Ok(());
        }
        let channels = self.get_channels();
        let patterns = self.get_patterns();
        {
            let mut sink = self.sink.lock().await;
            if !channels.is_empty() {
                if let Err(e) = sink.unsubscribe(channels).await {
                    warn!("구독 해제 실패: {}", e);
                }
            }
            if !patterns.is_empty() {
                if let Err(e) = sink.punsubscribe(patterns).await {
                    warn!("패턴 구독 해제 실패: {}", e);
                }
            }
        }
        if let Ok(mut state) = self.state.lock() {
            state.channels.clear();
            state.patterns.clear();
            state.alive = false;
        }
        self.stop_listener();
        Ok(())
    }

    fn record<F>(&self, update: F)
    where
        F: FnOnce(&mut SubscriptionState),
    {
        let closed = match self.state.lock() {
            Ok(mut state) => {
                update(&mut state);
                state.close_if_empty()
            }
            Err(_) => false,
        };
        if closed {
            debug!("채널과 패턴이 모두 해제되어 구독을 닫습니다");
            self.stop_listener();
        }
    }

    #[cfg(test)]
    pub(crate) fn has_listener(&self) -> bool {
        self.listener_task.lock().map(|t| t.is_some()).unwrap_or(false)
    }

    fn stop_listener(&self) {
        if let Ok(mut task) = self.listener_task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

fn add_all(target: &mut Vec<Vec<u8>>, items: Vec<Vec<u8>>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
