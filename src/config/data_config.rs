//! 실행 프로파일 및 서버 설정 모듈
//!
//! `PROFILE` 환경 변수로 실행 프로파일을 고르고, 프로파일별 `.env` 파일 이름과
//! 데모 서버의 바인딩 정보를 제공합니다.

use std::env;

/// 실행 프로파일
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// `PROFILE` 환경 변수로 현재 프로파일을 감지합니다. 기본값은 `Development`.
    pub fn current() -> Self {
        env::var("PROFILE")
            .map(|profile| Self::from_str(&profile))
            .unwrap_or(Environment::Development)
    }

    /// 프로파일 이름을 해석합니다 (대소문자 무관). 알 수 없는 값은 `Development`.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "prod" | "production" => Environment::Production,
            "test" | "testing" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn profile(&self) -> &'static str {
        match self {
            Environment::Development => "dev",
            Environment::Test => "test",
            Environment::Production => "prod",
        }
    }

    /// 프로파일 전용 설정 파일 이름 (`.env.dev`, `.env.prod` ...)
    pub fn env_file(&self) -> String {
        format!(".env.{}", self.profile())
    }
}

/// 데모 서버 설정
pub struct ServerConfig;

impl ServerConfig {
    /// `HOST`, 기본값 `127.0.0.1`
    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
    }

    /// `PORT`, 기본값 `8080`. 숫자가 아니면 기본값을 사용합니다.
    pub fn port() -> u16 {
        env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8080)
    }

    pub fn bind_address() -> (String, u16) {
        (Self::host(), Self::port())
    }

    /// 시스템 로그에 남길 서비스 식별자 (`SERVICE_ID`)
    pub fn service_id() -> String {
        env::var("SERVICE_ID").unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string())
    }

    /// 시작 시 구독할 채널 목록 (`REDIS_LISTEN_CHANNELS`, 쉼표 구분)
    pub fn listen_channels() -> Vec<String> {
        env::var("REDIS_LISTEN_CHANNELS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
