//! 데모 서버 라우트
//!
//! 라이브러리 기능을 HTTP로 확인할 수 있는 최소한의 엔드포인트입니다.
//! 모든 라우트는 `web::Data<HandlerManager>`를 공유합니다.
//!
//! - `GET /health` - Redis `PING` 결과 포함 상태 확인
//! - `POST /pubsub/{channel}` - JSON 본문을 채널에 발행
//! - `GET /pubsub/channels` - 현재 구독 중인 채널/패턴 조회
//!
//! ```bash
//! curl -X POST http://localhost:8080/pubsub/news \
//!   -H "Content-Type: application/json" \
//!   -d '{"title":"hello"}'
//! ```

use actix_web::{get, post, web, HttpResponse};
use log::warn;
use serde_json::json;

use crate::caching::HandlerManager;
use crate::core::errors::AppResult;
use crate::syslog::SysLogInfo;

pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);
    cfg.service(
        web::scope("/pubsub")
            .service(subscribed_channels)
            .service(publish),
    );
}

/// Redis에 닿지 않아도 200을 반환하고 `redis` 필드로 상태를 알립니다.
#[get("/health")]
async fn health_check(manager: web::Data<HandlerManager>) -> HttpResponse {
    let redis = match ping(&manager).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Redis 상태 확인 실패: {}", e);
            "DOWN".to_string()
        }
    };

    HttpResponse::Ok().json(json!({
        "status": if redis == "DOWN" { "degraded" } else { "healthy" },
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "redis": redis,
    }))
}

async fn ping(manager: &HandlerManager) -> AppResult<String> {
    manager.get_db_handler(manager.default_database())?.ping().await
}

#[post("/{channel}")]
async fn publish(
    manager: web::Data<HandlerManager>,
    channel: web::Path<String>,
    body: web::Json<serde_json::Value>,
    log: SysLogInfo,
) -> AppResult<HttpResponse> {
    let handler = manager.get_pub_sub_handler(manager.default_database())?;
    let receivers = handler.publish(&channel, &body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "channel": channel.into_inner(),
        "receivers": receivers,
        "from": log.remote_addr,
    })))
}

#[get("/channels")]
async fn subscribed_channels(manager: web::Data<HandlerManager>) -> AppResult<HttpResponse> {
    let handler = manager.get_pub_sub_handler(manager.default_database())?;

    Ok(HttpResponse::Ok().json(json!({
        "subscribed": handler.is_subscribed(),
        "channels": handler.get_channels(),
        "patterns": handler.get_patterns(),
    })))
}
