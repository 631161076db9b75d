//! Redis 기능별 핸들러
//!
//! 모든 핸들러는 데이터베이스별 [`RedisTemplate`]을 공유하며 [`RedisHandler`]를
//! 구현합니다. 이름으로 핸들러를 고를 때는
//! [`HandlerType`](crate::caching::handler_type::HandlerType)과 [`Handler`]를 사용합니다.

use std::sync::Arc;

use crate::caching::handler_type::HandlerType;
use crate::caching::template::RedisTemplate;

pub mod bitmap;
pub mod cluster;
pub mod custom_command;
pub mod db;
pub mod geo;
pub mod hash;
pub mod hyperloglog;
pub mod key;
pub mod list;
pub mod lock;
pub mod number;
pub mod pubsub;
pub mod script;
pub mod sentinel;
pub mod set;
pub mod stream;
pub mod string;
pub mod transaction;
pub mod zset;

pub use bitmap::BitmapHandler;
pub use cluster::ClusterHandler;
pub use custom_command::CustomCommandHandler;
pub use db::DbHandler;
pub use geo::{GeoHandler, GeoPoint, GeoUnit};
pub use hash::HashHandler;
pub use hyperloglog::HyperLogLogHandler;
pub use key::KeyHandler;
pub use list::ListHandler;
pub use lock::{RedisLock, RedisLockHandler};
pub use number::NumberHandler;
pub use pubsub::PubSubHandler;
pub use script::ScriptHandler;
pub use sentinel::SentinelHandler;
pub use set::SetHandler;
pub use stream::{StreamHandler, StreamRecord};
pub use string::StringHandler;
pub use transaction::TransactionHandler;
pub use zset::ZsetHandler;

/// 모든 Redis 핸들러의 공통 인터페이스
pub trait RedisHandler: Send + Sync {
    fn handler_type(&self) -> HandlerType;

    fn redis_template(&self) -> &Arc<RedisTemplate>;

    fn database(&self) -> i64 {
        self.redis_template().database()
    }
}

/// 종류별 핸들러를 담는 태그 유니언
///
/// pub/sub 핸들러는 구독 상태를 가지므로 `Arc`로 공유됩니다.
pub enum Handler {
    Db(DbHandler),
    Key(KeyHandler),
    Number(NumberHandler),
    String(StringHandler),
    List(ListHandler),
    Hash(HashHandler),
    Set(SetHandler),
    Zset(ZsetHandler),
    Bitmap(BitmapHandler),
    Geo(GeoHandler),
    HyperLogLog(HyperLogLogHandler),
    Script(ScriptHandler),
    PubSub(Arc<PubSubHandler>),
    Stream(StreamHandler),
    RedisLock(RedisLockHandler),
    Sentinel(SentinelHandler),
    Cluster(ClusterHandler),
    CustomCommand(CustomCommandHandler),
    Transaction(TransactionHandler),
}

impl Handler {
    pub fn handler_type(&self) -> HandlerType {
        self.as_redis_handler().handler_type()
    }

    pub fn as_redis_handler(&self) -> &dyn RedisHandler {
        match self {
            Handler::Db(h) => h,
            Handler::Key(h) => h,
            Handler::Number(h) => h,
            Handler::String(h) => h,
            Handler::List(h) => h,
            Handler::Hash(h) => h,
            Handler::Set(h) => h,
            Handler::Zset(h) => h,
            Handler::Bitmap(h) => h,
            Handler::Geo(h) => h,
            Handler::HyperLogLog(h) => h,
            Handler::Script(h) => h,
            Handler::PubSub(h) => &**h,
            Handler::Stream(h) => h,
            Handler::RedisLock(h) => h,
            Handler::Sentinel(h) => h,
            Handler::Cluster(h) => h,
            Handler::CustomCommand(h) => h,
            Handler::Transaction(h) => h,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::caching::connection::{RedisConnectionConfiguration, RedisConnectionFactory};
    use crate::caching::template::RedisTemplate;

    /// 접속할 수 없는 주소를 가리키는 템플릿. 연결은 첫 명령에서야 시도됩니다.
    pub(crate) fn unreachable_template() -> Arc<RedisTemplate> {
        let configuration = RedisConnectionConfiguration::standalone("redis://127.0.0.1:1");
        let factory = RedisConnectionFactory::new(configuration).unwrap();
        Arc::new(RedisTemplate::new(Arc::new(factory)))
    }

    /// 명령 인자를 문자열로 풀어냅니다.
    pub(crate) fn args(cmd: &redis::Cmd) -> Vec<String> {
        cmd.args_iter()
            .filter_map(|arg| match arg {
                redis::Arg::Simple(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                redis::Arg::Cursor => None,
            })
            .collect()
    }

    /// 문자열 키만 허용하는 JSON으로는 직렬화할 수 없는 값
    pub(crate) fn unserializable() -> std::collections::HashMap<(i32, i32), i32> {
        std::collections::HashMap::from([((1, 2), 3)])
    }
}
