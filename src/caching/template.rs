//! # Redis 템플릿
//!
//! Spring의 `RedisTemplate<String, Object>`에 해당하는 공유 파사드입니다.
//! 모든 핸들러는 데이터베이스 인덱스별로 하나씩 만들어진 템플릿을 공유합니다.
//!
//! ## 직렬화
//!
//! 값은 `serde_json`으로 JSON 문자열로 저장됩니다. 키는 문자열 그대로 사용합니다.
//!
//! ```rust,ignore
//! let template = RedisTemplate::new(Arc::new(factory));
//! let mut conn = template.connection().await?;
//! let json = template.serialize(&user)?;
//! let _: () = conn.set("user:1", json).await?;
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::connection::{NativeConnection, RedisConnection, RedisConnectionFactory};
use crate::core::errors::AppResult;

pub struct RedisTemplate {
    factory: Arc<RedisConnectionFactory>,
    /// 명령용 공유 연결 (자동 재연결)
    connection: RedisConnection,
}

impl RedisTemplate {
    pub fn new(factory: Arc<RedisConnectionFactory>) -> Self {
        let connection = factory.get_connection();
        Self { factory, connection }
    }

    pub fn get_required_connection_factory(&self) -> &Arc<RedisConnectionFactory> {
        &self.factory
    }

    pub fn database(&self) -> i64 {
        self.factory.get_database()
    }

    /// 명령 전송용 연결 복제본을 반환합니다.
    pub async fn connection(&self) -> AppResult<NativeConnection> {
        self.connection.native().await
    }

    /// 값을 JSON 문자열로 직렬화합니다.
    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> AppResult<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// JSON 바이트를 값으로 역직렬화합니다.
    pub fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> AppResult<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// 저장된 JSON 문자열을 역직렬화합니다. `None`은 그대로 `None`.
    pub fn deserialize_opt<T: DeserializeOwned>(&self, value: Option<String>) -> AppResult<Option<T>> {
        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 메시지를 직렬화해 채널에 발행합니다. 수신한 구독자 수를 반환합니다.
    pub async fn convert_and_send<T: Serialize + ?Sized>(&self, channel: &str, message: &T) -> AppResult<i64> {
        let payload = self.serialize(message)?;
        let mut connection = self.connection().await?;
        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(channel)
            .arg(payload)
            .query_async(&mut connection)
            .await?;
        Ok(receivers)
    }
}
