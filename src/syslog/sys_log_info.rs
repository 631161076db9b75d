//! 시스템 로그 레코드

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 로그 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    /// 정상 처리
    #[serde(rename = "0")]
    Info,
    /// 예외 발생
    #[serde(rename = "9")]
    Error,
}

impl LogType {
    pub fn code(&self) -> &'static str {
        match self {
            LogType::Info => "0",
            LogType::Error => "9",
        }
    }
}

/// 요청 하나에 대한 감사 로그 레코드
///
/// 요청 시작 시 한 번 만들어지며, `with_*` 메서드는 값을 소비하고 새 레코드를 반환합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SysLogInfo {
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub remote_addr: Option<String>,
    pub request_uri: String,
    pub method: String,
    pub user_agent: Option<String>,
    pub params: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// 처리 시간 (ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    pub create_time: DateTime<Utc>,
}

impl SysLogInfo {
    pub fn new(request_uri: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            log_type: LogType::Info,
            remote_addr: None,
            request_uri: request_uri.into(),
            method: method.into(),
            user_agent: None,
            params: String::new(),
            title: None,
            service_id: None,
            time: None,
            exception: None,
            create_time: Utc::now(),
        }
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..self }
    }

    pub fn with_service_id(self, service_id: impl Into<String>) -> Self {
        Self { service_id: Some(service_id.into()), ..self }
    }

    pub fn with_time(self, elapsed_millis: u64) -> Self {
        Self { time: Some(elapsed_millis), ..self }
    }

    /// 예외 메시지를 기록하고 종류를 `Error`로 바꿉니다.
    pub fn with_exception(self, exception: impl Into<String>) -> Self {
        Self {
            log_type: LogType::Error,
            exception: Some(exception.into()),
            ..self
        }
    }

    pub fn is_error(&self) -> bool {
        self.log_type == LogType::Error
    }
}
