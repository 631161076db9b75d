//! Redis 연결 계층
//!
//! - [`configuration`] - 단일/클러스터/센티널 연결 설정
//! - [`factory`] - 설정을 연결 객체로 바꿔 주는 팩토리
//! - [`redis_connection`] - 표준 연결과 pub/sub 구독 소유
//! - [`subscription`] - 구독 상태와 메시지 리스너
//! - [`cluster`], [`sentinel`], [`reactive`] - 모드별 연결

pub mod cluster;
pub mod configuration;
pub mod factory;
pub mod reactive;
pub mod redis_connection;
pub mod sentinel;
pub mod subscription;

pub use cluster::RedisClusterConnection;
pub use configuration::{RedisConnectionConfiguration, RedisMode};
pub use factory::RedisConnectionFactory;
pub use reactive::{ReactiveRedisClusterConnection, ReactiveRedisConnection};
pub use redis_connection::{NativeConnection, RedisConnection};
pub use sentinel::RedisSentinelConnection;
pub use subscription::{Message, MessageListener, Subscription, SubscriptionSink};
