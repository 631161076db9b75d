//! framework_common 데모 서버
//!
//! Redis 핸들러 매니저를 구성하고, 시스템 로그 미들웨어를 적용한 Actix-web 서버를 띄웁니다.

use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};

use framework_common::caching::connection::Message;
use framework_common::caching::{HandlerManager, RedisConnectionFactory};
use framework_common::config::{Environment, RedisConfig, ServerConfig};
use framework_common::middlewares::SysLogMiddleware;
use framework_common::routes::configure_all_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    load_env_file();
    init_logging();

    info!("🚀 framework_common 데모 서버 시작중...");

    let manager = match build_handler_manager() {
        Ok(manager) => web::Data::new(manager),
        Err(e) => {
            error!("Redis 설정 실패: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    subscribe_listen_channels(&manager).await;

    start_http_server(manager).await
}

/// HTTP 서버를 구성하고 실행합니다
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server(manager: web::Data<HandlerManager>) -> std::io::Result<()> {
    let (host, port) = ServerConfig::bind_address();
    let service_id = ServerConfig::service_id();

    info!("🌐 서버가 http://{}:{} 에서 실행중입니다", host, port);
    info!("📍 Health check: http://{}:{}/health", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(manager.clone())
            .wrap(SysLogMiddleware::with_service_id(service_id.clone()))
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_all_routes)
    })
    .bind((host.as_str(), port))?
    .workers(4)
    .run()
    .await
}

/// 프로파일별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - `.env.dev` (기본값)
/// * `PROFILE=test` - `.env.test`
/// * `PROFILE=prod` - `.env.prod`
///
/// 프로파일 파일이 없으면 기본 `.env`를 시도합니다.
fn load_env_file() {
    let environment = Environment::current();
    let file = environment.env_file();

    match dotenv::from_filename(&file) {
        Ok(_) => info!("{} 파일 로드 됨", file),
        Err(e) => {
            warn!("{} 파일 로드 실패: {}", file, e);
            if dotenv().is_ok() {
                info!("기본 .env 파일 로드");
            }
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// * `RUST_LOG` - 로깅 레벨 설정 (기본값: "info,actix_web=debug")
///
/// ```bash
/// RUST_LOG=framework_common::caching=debug cargo run
/// ```
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// 환경 변수로 연결 팩토리와 핸들러 매니저를 구성합니다
///
/// 서버 접속은 첫 명령 시점에 이루어지므로 Redis가 내려가 있어도 서버는 뜹니다.
fn build_handler_manager() -> framework_common::core::AppResult<HandlerManager> {
    let configuration = RedisConfig::from_env()?;
    let factory = RedisConnectionFactory::new(configuration)?;
    Ok(HandlerManager::new(Arc::new(factory)))
}

/// `REDIS_LISTEN_CHANNELS`에 지정된 채널을 구독하고 받은 메시지를 로그로 남깁니다
async fn subscribe_listen_channels(manager: &HandlerManager) {
    let channels = ServerConfig::listen_channels();
    if channels.is_empty() {
        return;
    }

    let handler = match manager.get_pub_sub_handler(manager.default_database()) {
        Ok(handler) => handler,
        Err(e) => {
            warn!("Pub/Sub 핸들러 생성 실패: {}", e);
            return;
        }
    };

    let names: Vec<&str> = channels.iter().map(String::as_str).collect();
    match handler.subscribe(log_message, &names).await {
        Ok(()) => info!("✅ 채널 구독: {:?}", channels),
        Err(e) => warn!("채널 구독 실패: {}", e),
    }
}

fn log_message(message: &Message, _pattern: Option<&[u8]>) {
    info!(
        "📨 [{}] {}",
        message.channel_name(),
        String::from_utf8_lossy(message.body())
    );
}
