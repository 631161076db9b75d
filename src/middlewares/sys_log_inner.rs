//! SysLogMiddleware 기록 로직
use std::rc::Rc;
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use log::{info, warn};

use crate::syslog::{get_sys_log, SysLogInfo};

/// 요청 전후로 로그 레코드를 만드는 서비스
pub struct SysLogMiddlewareService<S> {
    pub service: Rc<S>,
    pub service_id: Option<String>,
}

impl<S, B> Service<ServiceRequest> for SysLogMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let started = Instant::now();

        let mut record = get_sys_log(req.request());
        if let Some(service_id) = &self.service_id {
            record = record.with_service_id(service_id.clone());
        }
        req.extensions_mut().insert(record.clone());

        Box::pin(async move {
            let result = service.call(req).await;
            let elapsed = started.elapsed().as_millis() as u64;
            let record = record.with_time(elapsed);

            match &result {
                Ok(res) => match res.response().error() {
                    Some(error) => write_record(&record.with_exception(error.to_string())),
                    None => write_record(&record),
                },
                Err(error) => write_record(&record.with_exception(error.to_string())),
            }

            result
        })
    }
}

fn write_record(record: &SysLogInfo) {
    match serde_json::to_string(record) {
        Ok(json) => info!("{}", json),
        Err(e) => warn!("시스템 로그 직렬화 실패: {}", e),
    }
}
