//! # 요청 메타데이터 추출
//!
//! 현재 actix-web 요청에서 감사 로그에 필요한 정보를 뽑아 [`SysLogInfo`]를 만듭니다.
//!
//! ## 클라이언트 IP
//!
//! 프록시 헤더를 아래 순서로 확인하고, 값이 쉼표 목록이면 `unknown`이 아닌 첫 항목을
//! 사용합니다. 모두 비어 있으면 소켓의 상대 주소를 사용합니다.
//!
//! 1. `X-Forwarded-For`
//! 2. `X-Real-IP`
//! 3. `Proxy-Client-IP`
//! 4. `WL-Proxy-Client-IP`
//! 5. `HTTP_CLIENT_IP`
//! 6. `HTTP_X_FORWARDED_FOR`
//!
//! ## 핸들러에서 사용
//!
//! ```rust,ignore
//! async fn create_order(log: SysLogInfo, body: web::Json<Order>) -> impl Responder {
//!     info!("{} {} from {:?}", log.method, log.request_uri, log.remote_addr);
//!     // ...
//! }
//! ```

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use super::sys_log_info::SysLogInfo;
use crate::core::errors::{AppError, AppResult};

const CLIENT_IP_HEADERS: [&str; 6] = [
    "X-Forwarded-For",
    "X-Real-IP",
    "Proxy-Client-IP",
    "WL-Proxy-Client-IP",
    "HTTP_CLIENT_IP",
    "HTTP_X_FORWARDED_FOR",
];

/// 요청 정보로 `Info` 종류의 로그 레코드를 만듭니다.
pub fn get_sys_log(req: &HttpRequest) -> SysLogInfo {
    let mut info = SysLogInfo::new(req.path(), req.method().as_str());
    info.remote_addr = client_ip(req);
    info.user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    info.params = to_params(req.query_string());
    info
}

/// 활성 요청이 있을 때만 로그 레코드를 만듭니다.
///
/// # Errors
///
/// * `MissingRequestContext` - 요청 컨텍스트 밖에서 호출한 경우
pub fn current_sys_log(req: Option<&HttpRequest>) -> AppResult<SysLogInfo> {
    req.map(get_sys_log).ok_or(AppError::MissingRequestContext)
}

/// 클라이언트 IP를 찾습니다.
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    CLIENT_IP_HEADERS
        .iter()
        .filter_map(|name| req.headers().get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(first_known_ip)
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
}

/// 다단계 프록시 목록에서 `unknown`이 아닌 첫 값
fn first_known_ip(value: &str) -> Option<String> {
    value
        .split(',')
        .map(str::trim)
        .find(|ip| !is_unknown(ip))
        .map(str::to_string)
}

fn is_unknown(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("unknown")
}

/// 쿼리 문자열을 나타난 순서대로 `k=v&k2=v2` 형태로 다시 인코딩합니다.
pub fn to_params(query: &str) -> String {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            format!("{}={}", reencode(key), reencode(value))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn reencode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    let decoded = urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced);
    urlencoding::encode(&decoded).into_owned()
}

/// 미들웨어가 저장한 레코드가 있으면 그것을, 없으면 새로 만든 레코드를 추출합니다.
impl FromRequest for SysLogInfo {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let stored = req.extensions().get::<SysLogInfo>().cloned();
        ready(Ok(stored.unwrap_or_else(|| get_sys_log(req))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syslog::sys_log_info::LogType;
    use actix_web::test::TestRequest;
    use std::net::SocketAddr;

    fn peer() -> SocketAddr {
        "10.0.0.9:51234".parse().unwrap()
    }

    #[test]
    fn test_get_sys_log_captures_request() {
        let req = TestRequest::post()
            .uri("/orders/7?page=1&q=hello%20world")
            .insert_header((header::USER_AGENT, "curl/8.0"))
            .peer_addr(peer())
            .to_http_request();

        let info = get_sys_log(&req);

        assert_eq!(info.log_type, LogType::Info);
        assert_eq!(info.request_uri, "/orders/7");
        assert_eq!(info.method, "POST");
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(info.params, "page=1&q=hello%20world");
        assert_eq!(info.remote_addr.as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_client_ip_prefers_proxy_headers() {
        let req = TestRequest::get()
            .insert_header(("X-Forwarded-For", "unknown, 203.0.113.5, 10.0.0.1"))
            .insert_header(("X-Real-IP", "198.51.100.2"))
            .peer_addr(peer())
            .to_http_request();

        assert_eq!(client_ip(&req).as_deref(), Some("203.0.113.5"));
    }

    #[test]
    fn test_client_ip_skips_unknown_headers() {
        let req = TestRequest::get()
            .insert_header(("X-Forwarded-For", "unknown"))
            .insert_header(("Proxy-Client-IP", "198.51.100.7"))
            .peer_addr(peer())
            .to_http_request();

        assert_eq!(client_ip(&req).as_deref(), Some("198.51.100.7"));
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let req = TestRequest::get().peer_addr(peer()).to_http_request();

        assert_eq!(client_ip(&req).as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_to_params_keeps_order() {
        assert_eq!(to_params("b=2&a=1&flag"), "b=2&a=1&flag=");
        assert_eq!(to_params("name=a+b"), "name=a%20b");
        assert_eq!(to_params(""), "");
    }

    #[test]
    fn test_current_sys_log_requires_request() {
        let req = TestRequest::get().uri("/health").to_http_request();

        assert!(matches!(current_sys_log(None), Err(AppError::MissingRequestContext)));
        assert_eq!(current_sys_log(Some(&req)).unwrap().request_uri, "/health");
    }

    #[actix_web::test]
    async fn test_extractor_prefers_stored_record() {
        let req = TestRequest::get().uri("/users").to_http_request();
        req.extensions_mut()
            .insert(SysLogInfo::new("/users", "GET").with_title("사용자 조회"));

        let info = SysLogInfo::extract(&req).await.unwrap();

        assert_eq!(info.title.as_deref(), Some("사용자 조회"));
    }
}
