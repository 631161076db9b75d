//! # 핸들러 매니저
//!
//! 데이터베이스 인덱스마다 [`RedisTemplate`]을 하나씩 만들어 캐싱하고,
//! 그 템플릿을 공유하는 핸들러를 돌려줍니다.
//!
//! ```rust,ignore
//! let manager = HandlerManager::new(Arc::new(factory));
//! let strings = manager.get_string_handler(0)?;
//! strings.set("greeting", &"hello").await?;
//!
//! let handler = manager.get_handler("zset".parse()?, 1)?;
//! ```
//!
//! pub/sub 핸들러는 구독 상태를 가지므로 데이터베이스마다 하나만 만들어 재사용합니다.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::info;

use super::connection::RedisConnectionFactory;
use super::handler_type::HandlerType;
use super::handlers::{
    BitmapHandler, ClusterHandler, CustomCommandHandler, DbHandler, GeoHandler, Handler, HashHandler,
    HyperLogLogHandler, KeyHandler, ListHandler, NumberHandler, PubSubHandler, RedisLockHandler,
    ScriptHandler, SentinelHandler, SetHandler, StreamHandler, StringHandler, TransactionHandler,
    ZsetHandler,
};
use super::template::RedisTemplate;
use crate::core::errors::{AppError, AppResult};

pub struct HandlerManager {
    factory: Arc<RedisConnectionFactory>,
    templates: RwLock<HashMap<i64, Arc<RedisTemplate>>>,
    pub_sub_handlers: RwLock<HashMap<i64, Arc<PubSubHandler>>>,
}

impl HandlerManager {
    pub fn new(factory: Arc<RedisConnectionFactory>) -> Self {
        Self {
            factory,
            templates: RwLock::new(HashMap::new()),
            pub_sub_handlers: RwLock::new(HashMap::new()),
        }
    }

    /// 기본 팩토리의 데이터베이스 인덱스
    pub fn default_database(&self) -> i64 {
        self.factory.get_database()
    }

    /// 데이터베이스 인덱스의 템플릿을 반환합니다. 없으면 만들어 캐싱합니다.
    ///
    /// # Errors
    ///
    /// * `InvalidResourceUsage` - 음수 인덱스
    pub fn create_redis_template(&self, db_index: i64) -> AppResult<Arc<RedisTemplate>> {
        if let Some(template) = self.read_templates()?.get(&db_index) {
            return Ok(Arc::clone(template));
        }

        let factory = if db_index == self.factory.get_database() {
            Arc::clone(&self.factory)
        } else {
            Arc::new(self.factory.with_database(db_index)?)
        };

        let mut templates = self
            .templates
            .write()
            .map_err(|_| AppError::InternalError("Template cache lock poisoned".to_string()))?;
        let template = templates
            .entry(db_index)
            .or_insert_with(|| {
                info!("RedisTemplate 생성 (db: {})", db_index);
                Arc::new(RedisTemplate::new(factory))
            })
            .clone();
        Ok(template)
    }

    /// 종류 이름으로 핸들러를 고릅니다.
    pub fn get_handler(&self, handler_type: HandlerType, db_index: i64) -> AppResult<Handler> {
        if handler_type == HandlerType::PubSub {
            return Ok(Handler::PubSub(self.get_pub_sub_handler(db_index)?));
        }
        Ok(handler_type.create(self.create_redis_template(db_index)?))
    }

    pub fn get_db_handler(&self, db_index: i64) -> AppResult<DbHandler> {
        Ok(DbHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_key_handler(&self, db_index: i64) -> AppResult<KeyHandler> {
        Ok(KeyHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_number_handler(&self, db_index: i64) -> AppResult<NumberHandler> {
        Ok(NumberHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_string_handler(&self, db_index: i64) -> AppResult<StringHandler> {
        Ok(StringHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_list_handler(&self, db_index: i64) -> AppResult<ListHandler> {
        Ok(ListHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_hash_handler(&self, db_index: i64) -> AppResult<HashHandler> {
        Ok(HashHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_set_handler(&self, db_index: i64) -> AppResult<SetHandler> {
        Ok(SetHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_zset_handler(&self, db_index: i64) -> AppResult<ZsetHandler> {
        Ok(ZsetHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_bitmap_handler(&self, db_index: i64) -> AppResult<BitmapHandler> {
        Ok(BitmapHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_geo_handler(&self, db_index: i64) -> AppResult<GeoHandler> {
        Ok(GeoHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_hyper_log_log_handler(&self, db_index: i64) -> AppResult<HyperLogLogHandler> {
        Ok(HyperLogLogHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_script_handler(&self, db_index: i64) -> AppResult<ScriptHandler> {
        Ok(ScriptHandler::new(self.create_redis_template(db_index)?))
    }

    /// 데이터베이스별로 하나인 pub/sub 핸들러
    pub fn get_pub_sub_handler(&self, db_index: i64) -> AppResult<Arc<PubSubHandler>> {
        if let Some(handler) = self.read_pub_sub_handlers()?.get(&db_index) {
            return Ok(Arc::clone(handler));
        }

        let template = self.create_redis_template(db_index)?;
        let mut handlers = self
            .pub_sub_handlers
            .write()
            .map_err(|_| AppError::InternalError("Pub/Sub handler cache lock poisoned".to_string()))?;
        let handler = handlers
            .entry(db_index)
            .or_insert_with(|| Arc::new(PubSubHandler::new(template)))
            .clone();
        Ok(handler)
    }

    pub fn get_stream_handler(&self, db_index: i64) -> AppResult<StreamHandler> {
        Ok(StreamHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_redis_lock_handler(&self, db_index: i64) -> AppResult<RedisLockHandler> {
        Ok(RedisLockHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_sentinel_handler(&self, db_index: i64) -> AppResult<SentinelHandler> {
        Ok(SentinelHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_cluster_handler(&self, db_index: i64) -> AppResult<ClusterHandler> {
        Ok(ClusterHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_custom_command_handler(&self, db_index: i64) -> AppResult<CustomCommandHandler> {
        Ok(CustomCommandHandler::new(self.create_redis_template(db_index)?))
    }

    pub fn get_transaction_handler(&self, db_index: i64) -> AppResult<TransactionHandler> {
        Ok(TransactionHandler::new(self.create_redis_template(db_index)?))
    }

    fn read_templates(
        &self,
    ) -> AppResult<std::sync::RwLockReadGuard<'_, HashMap<i64, Arc<RedisTemplate>>>> {
        self.templates
            .read()
            .map_err(|_| AppError::InternalError("Template cache lock poisoned".to_string()))
    }

    fn read_pub_sub_handlers(
        &self,
    ) -> AppResult<std::sync::RwLockReadGuard<'_, HashMap<i64, Arc<PubSubHandler>>>> {
        self.pub_sub_handlers
            .read()
            .map_err(|_| AppError::InternalError("Pub/Sub handler cache lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::connection::RedisConnectionConfiguration;
    use crate::caching::handlers::RedisHandler;

    fn manager() -> HandlerManager {
        let configuration = RedisConnectionConfiguration::standalone("redis://127.0.0.1:1");
        HandlerManager::new(Arc::new(RedisConnectionFactory::new(configuration).unwrap()))
    }

    #[test]
    fn test_template_is_cached_per_database() {
        let manager = manager();

        let first = manager.create_redis_template(0).unwrap();
        let again = manager.create_redis_template(0).unwrap();
        let other = manager.create_redis_template(3).unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(first.database(), 0);
        assert_eq!(other.database(), 3);
    }

    #[test]
    fn test_default_database_reuses_factory() {
        let manager = manager();

        let template = manager.create_redis_template(manager.default_database()).unwrap();

        assert!(Arc::ptr_eq(template.get_required_connection_factory(), &manager.factory));
    }

    #[test]
    fn test_negative_database_is_rejected() {
        let manager = manager();

        assert!(matches!(
            manager.create_redis_template(-1),
            Err(AppError::InvalidResourceUsage(_))
        ));
    }

    #[test]
    fn test_typed_getters_share_template() {
        let manager = manager();

        let strings = manager.get_string_handler(1).unwrap();
        let hashes = manager.get_hash_handler(1).unwrap();

        assert!(Arc::ptr_eq(strings.redis_template(), hashes.redis_template()));
        assert_eq!(strings.database(), 1);
    }

    #[test]
    fn test_pub_sub_handler_is_shared() {
        let manager = manager();

        let first = manager.get_pub_sub_handler(0).unwrap();
        let second = manager.get_pub_sub_handler(0).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        match manager.get_handler(HandlerType::PubSub, 0).unwrap() {
            Handler::PubSub(handler) => assert!(Arc::ptr_eq(&handler, &first)),
            _ => panic!("expected pub/sub handler"),
        }
    }

    #[test]
    fn test_get_handler_by_type() {
        let manager = manager();

        let handler = manager.get_handler(HandlerType::Geo, 2).unwrap();

        assert_eq!(handler.handler_type(), HandlerType::Geo);
        assert_eq!(handler.as_redis_handler().database(), 2);
    }
}
