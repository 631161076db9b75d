//! 시스템 로그 미들웨어
//!
//! 요청마다 [`SysLogInfo`](crate::syslog::SysLogInfo)를 만들어 요청 extension에 저장하고,
//! 응답이 끝나면 처리 시간과 에러를 채워 JSON 한 줄로 기록합니다.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};

use crate::middlewares::sys_log_inner::SysLogMiddlewareService;

/// 시스템 로그 미들웨어
#[derive(Debug, Clone, Default)]
pub struct SysLogMiddleware {
    /// 레코드에 남길 서비스 식별자
    service_id: Option<String>,
}

impl SysLogMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_id(service_id: impl Into<String>) -> Self {
        Self {
            service_id: Some(service_id.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SysLogMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SysLogMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SysLogMiddlewareService {
            service: Rc::new(service),
            service_id: self.service_id.clone(),
        }))
    }
}
