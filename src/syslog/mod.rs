//! 시스템 로그 모듈
//!
//! 감사 로그를 위한 요청 메타데이터 추출과 인자 표현식 평가를 제공합니다.
//!
//! - [`sys_log_info`] - 로그 레코드 ([`SysLogInfo`], [`LogType`])
//! - [`sys_log_utils`] - 현재 요청에서 레코드 추출
//! - [`expression`] - `#id + 1` 같은 파라미터 표현식 평가
//!
//! 요청 전체를 기록하려면 [`SysLogMiddleware`](crate::middlewares::SysLogMiddleware)를
//! 등록합니다.

pub mod expression;
pub mod sys_log_info;
pub mod sys_log_utils;

pub use expression::{get_context, get_value, EvaluationContext, Expression};
pub use sys_log_info::{LogType, SysLogInfo};
pub use sys_log_utils::{current_sys_log, get_sys_log};
