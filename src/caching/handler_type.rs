//! # 핸들러 종류
//!
//! Redis 기능 이름과 핸들러 구현을 잇는 고정 테이블입니다.
//! 리플렉션 없이 [`HandlerType::create`]에서 직접 생성합니다.
//!
//! | 종류 | 이름 | 핸들러 |
//! |------|------|--------|
//! | `Db` | `DB` | [`DbHandler`] |
//! | `Key` | `KEY` | [`KeyHandler`] |
//! | `Number` | `NUMBER` | [`NumberHandler`] |
//! | `String` | `STRING` | [`StringHandler`] |
//! | `List` | `LIST` | [`ListHandler`] |
//! | `Hash` | `HASH` | [`HashHandler`] |
//! | `Set` | `SET` | [`SetHandler`] |
//! | `Zset` | `ZSET` | [`ZsetHandler`] |
//! | `Bitmap` | `BITMAP` | [`BitmapHandler`] |
//! | `Geo` | `GEO` | [`GeoHandler`] |
//! | `HyperLogLog` | `HYPERLOGLOG` | [`HyperLogLogHandler`] |
//! | `Script` | `SCRIPT` | [`ScriptHandler`] |
//! | `PubSub` | `PUBSUB` | [`PubSubHandler`] |
//! | `Stream` | `STREAM` | [`StreamHandler`] |
//! | `RedisLock` | `REDISLOCK` | [`RedisLockHandler`] |
//! | `Sentinel` | `SENTINEL` | [`SentinelHandler`] |
//! | `Cluster` | `CLUSTER` | [`ClusterHandler`] |
//! | `CustomCommand` | `CUSTOMCOMMAND` | [`CustomCommandHandler`] |
//! | `Transaction` | `TRANSACTION` | [`TransactionHandler`] |

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::handlers::{
    BitmapHandler, ClusterHandler, CustomCommandHandler, DbHandler, GeoHandler, Handler, HashHandler,
    HyperLogLogHandler, KeyHandler, ListHandler, NumberHandler, PubSubHandler, RedisLockHandler,
    ScriptHandler, SentinelHandler, SetHandler, StreamHandler, StringHandler, TransactionHandler,
    ZsetHandler,
};
use super::template::RedisTemplate;
use crate::core::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerType {
    Db,
    Key,
    Number,
    String,
    List,
    Hash,
    Set,
    Zset,
    Bitmap,
    Geo,
    HyperLogLog,
    Script,
    PubSub,
    Stream,
    RedisLock,
    Sentinel,
    Cluster,
    CustomCommand,
    Transaction,
}

impl HandlerType {
    pub const ALL: [HandlerType; 19] = [
        HandlerType::Db,
        HandlerType::Key,
        HandlerType::Number,
        HandlerType::String,
        HandlerType::List,
        HandlerType::Hash,
        HandlerType::Set,
        HandlerType::Zset,
        HandlerType::Bitmap,
        HandlerType::Geo,
        HandlerType::HyperLogLog,
        HandlerType::Script,
        HandlerType::PubSub,
        HandlerType::Stream,
        HandlerType::RedisLock,
        HandlerType::Sentinel,
        HandlerType::Cluster,
        HandlerType::CustomCommand,
        HandlerType::Transaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerType::Db => "DB",
            HandlerType::Key => "KEY",
            HandlerType::Number => "NUMBER",
            HandlerType::String => "STRING",
            HandlerType::List => "LIST",
            HandlerType::Hash => "HASH",
            HandlerType::Set => "SET",
            HandlerType::Zset => "ZSET",
            HandlerType::Bitmap => "BITMAP",
            HandlerType::Geo => "GEO",
            HandlerType::HyperLogLog => "HYPERLOGLOG",
            HandlerType::Script => "SCRIPT",
            HandlerType::PubSub => "PUBSUB",
            HandlerType::Stream => "STREAM",
            HandlerType::RedisLock => "REDISLOCK",
            HandlerType::Sentinel => "SENTINEL",
            HandlerType::Cluster => "CLUSTER",
            HandlerType::CustomCommand => "CUSTOMCOMMAND",
            HandlerType::Transaction => "TRANSACTION",
        }
    }

    /// 이 종류를 구현하는 핸들러의 타입 이름
    pub fn type_name(&self) -> &'static str {
        match self {
            HandlerType::Db => std::any::type_name::<DbHandler>(),
            HandlerType::Key => std::any::type_name::<KeyHandler>(),
            HandlerType::Number => std::any::type_name::<NumberHandler>(),
            HandlerType::String => std::any::type_name::<StringHandler>(),
            HandlerType::List => std::any::type_name::<ListHandler>(),
            HandlerType::Hash => std::any::type_name::<HashHandler>(),
            HandlerType::Set => std::any::type_name::<SetHandler>(),
            HandlerType::Zset => std::any::type_name::<ZsetHandler>(),
            HandlerType::Bitmap => std::any::type_name::<BitmapHandler>(),
            HandlerType::Geo => std::any::type_name::<GeoHandler>(),
            HandlerType::HyperLogLog => std::any::type_name::<HyperLogLogHandler>(),
            HandlerType::Script => std::any::type_name::<ScriptHandler>(),
            HandlerType::PubSub => std::any::type_name::<PubSubHandler>(),
            HandlerType::Stream => std::any::type_name::<StreamHandler>(),
            HandlerType::RedisLock => std::any::type_name::<RedisLockHandler>(),
            HandlerType::Sentinel => std::any::type_name::<SentinelHandler>(),
            HandlerType::Cluster => std::any::type_name::<ClusterHandler>(),
            HandlerType::CustomCommand => std::any::type_name::<CustomCommandHandler>(),
            HandlerType::Transaction => std::any::type_name::<TransactionHandler>(),
        }
    }

    /// 템플릿을 공유하는 핸들러를 생성합니다.
    pub fn create(&self, template: Arc<RedisTemplate>) -> Handler {
        match self {
            HandlerType::Db => Handler::Db(DbHandler::new(template)),
            HandlerType::Key => Handler::Key(KeyHandler::new(template)),
            HandlerType::Number => Handler::Number(NumberHandler::new(template)),
            HandlerType::String => Handler::String(StringHandler::new(template)),
            HandlerType::List => Handler::List(ListHandler::new(template)),
            HandlerType::Hash => Handler::Hash(HashHandler::new(template)),
            HandlerType::Set => Handler::Set(SetHandler::new(template)),
            HandlerType::Zset => Handler::Zset(ZsetHandler::new(template)),
            HandlerType::Bitmap => Handler::Bitmap(BitmapHandler::new(template)),
            HandlerType::Geo => Handler::Geo(GeoHandler::new(template)),
            HandlerType::HyperLogLog => Handler::HyperLogLog(HyperLogLogHandler::new(template)),
            HandlerType::Script => Handler::Script(ScriptHandler::new(template)),
            HandlerType::PubSub => Handler::PubSub(Arc::new(PubSubHandler::new(template))),
            HandlerType::Stream => Handler::Stream(StreamHandler::new(template)),
            HandlerType::RedisLock => Handler::RedisLock(RedisLockHandler::new(template)),
            HandlerType::Sentinel => Handler::Sentinel(SentinelHandler::new(template)),
            HandlerType::Cluster => Handler::Cluster(ClusterHandler::new(template)),
            HandlerType::CustomCommand => Handler::CustomCommand(CustomCommandHandler::new(template)),
            HandlerType::Transaction => Handler::Transaction(TransactionHandler::new(template)),
        }
    }
}

impl fmt::Display for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandlerType::ALL
            .iter()
            .copied()
            .find(|handler_type| handler_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidResourceUsage(format!("Unknown handler type: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::connection::{RedisConnectionConfiguration, RedisConnectionFactory};

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("pubsub".parse::<HandlerType>().unwrap(), HandlerType::PubSub);
        assert_eq!("RedisLock".parse::<HandlerType>().unwrap(), HandlerType::RedisLock);
        assert_eq!(" zset ".parse::<HandlerType>().unwrap(), HandlerType::Zset);
        assert!("queue".parse::<HandlerType>().is_err());
    }

    #[test]
    fn test_names_round_trip_for_every_type() {
        for handler_type in HandlerType::ALL {
            assert_eq!(handler_type.as_str().parse::<HandlerType>().unwrap(), handler_type);
            assert_eq!(handler_type.to_string(), handler_type.as_str());
        }
    }

    #[test]
    fn test_type_name_points_to_handler() {
        assert!(HandlerType::PubSub.type_name().ends_with("PubSubHandler"));
        assert!(HandlerType::Db.type_name().ends_with("DbHandler"));
        assert!(HandlerType::CustomCommand.type_name().ends_with("CustomCommandHandler"));
    }

    #[test]
    fn test_create_builds_matching_handler() {
        let configuration = RedisConnectionConfiguration::standalone("redis://127.0.0.1:1");
        let factory = Arc::new(RedisConnectionFactory::new(configuration).unwrap());
        let template = Arc::new(RedisTemplate::new(factory));

        for handler_type in HandlerType::ALL {
            let handler = handler_type.create(Arc::clone(&template));
            assert_eq!(handler.handler_type(), handler_type);
            assert_eq!(handler.as_redis_handler().handler_type(), handler_type);
        }
    }
}
