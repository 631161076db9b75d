//! 미들웨어 모듈
//!
//! ActixWeb 요청 처리 파이프라인에서 사용되는 미들웨어들을 제공합니다.
//! Spring의 Filter/Aspect처럼 횡단 관심사를 처리합니다.
//!
//! # 제공 미들웨어
//!
//! ### 시스템 로그 미들웨어 (SysLogMiddleware)
//! - 요청 시작 시 클라이언트 IP, URI, 메서드, User-Agent, 쿼리 파라미터 수집
//! - 레코드를 request extension에 저장 (핸들러에서 `SysLogInfo` 추출 가능)
//! - 처리 시간과 에러 메시지를 채워 JSON으로 기록
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! use actix_web::{App, HttpServer};
//! use framework_common::middlewares::SysLogMiddleware;
//!
//! HttpServer::new(|| {
//!     App::new()
//!         .wrap(SysLogMiddleware::with_service_id("order-service"))
//!         .service(/* 라우트들 */)
//! })
//! ```

pub mod sys_log_middleware;
mod sys_log_inner;

pub use sys_log_middleware::SysLogMiddleware;
