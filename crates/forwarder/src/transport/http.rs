//! reqwest 기반 HTTP 전송 계층
//!
//! 정적으로 설정된 엔드포인트에 `POST {endpoint}{path}`로 배치를 보냅니다.
//! 엔드포인트는 설정된 URL 끝에 API 버전 경로(`v3.0` 등)가 없으면 덧붙여 만듭니다.
//!
//! # 헤더
//! - `Content-Type: application/json`
//! - `X-Auth-Token`: 설정된 경우에만
//! - `User-Agent`: 설정값

use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use super::{Transport, TransportError};

/// 인증 토큰 헤더 이름
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// 에러 메시지에 담을 응답 본문 최대 길이
const MAX_ERROR_BODY_LEN: usize = 512;

/// HTTP 전송 계층 설정
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// 로그 API 기본 URL
    pub url: String,
    /// URL에 덧붙일 API 버전 경로 (빈 문자열이면 생략)
    pub version: String,
    /// 정적 인증 토큰
    pub auth_token: Option<String>,
    /// 요청 타임아웃
    pub request_timeout: Duration,
    /// User-Agent 헤더
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self::from_core(&logfwd_core::config::ApiConfig::default())
    }
}

impl HttpTransportConfig {
    /// core의 `ApiConfig`에서 전송 설정을 생성합니다.
    pub fn from_core(core: &logfwd_core::config::ApiConfig) -> Self {
        Self {
            url: core.url.clone(),
            version: core.version.clone(),
            auth_token: core.auth_token.clone(),
            request_timeout: Duration::from_secs(core.request_timeout_secs),
            user_agent: core.user_agent.clone(),
        }
    }

    /// 버전 경로가 반영된 엔드포인트를 계산합니다.
    pub fn endpoint(&self) -> String {
        let base = self.url.trim_end_matches('/');
        if self.version.is_empty() || base.ends_with(self.version.as_str()) {
            base.to_owned()
        } else {
            format!("{base}/{}", self.version)
        }
    }
}

/// reqwest 클라이언트를 사용하는 [`Transport`] 구현체
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// 새 HTTP 전송 계층을 생성합니다.
    ///
    /// # Errors
    /// 토큰이 헤더 값으로 쓸 수 없거나 클라이언트 생성에 실패하면
    /// [`TransportError::Request`]를 반환합니다.
    pub fn new(config: &HttpTransportConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.auth_token {
            let mut value = HeaderValue::from_str(token)
                .map_err(|e| TransportError::Request(format!("invalid auth token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTH_TOKEN_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }

    /// 요청을 보낼 엔드포인트를 반환합니다.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn send(&self, path: &str, body: Bytes) -> Result<(), TransportError> {
        let url = format!("{}{}", self.endpoint, path);
        debug!(url = %url, bytes = body.len(), "posting batch");

        let resp = self
            .client
            .post(&url)
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized {
                status: status.as_u16(),
            });
        }

        let mut body = resp.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY_LEN {
            let mut cut = MAX_ERROR_BODY_LEN;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, version: &str) -> HttpTransportConfig {
        HttpTransportConfig {
            url: url.to_owned(),
            version: version.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn endpoint_appends_version() {
        assert_eq!(
            config("http://monasca:5607", "v3.0").endpoint(),
            "http://monasca:5607/v3.0"
        );
        assert_eq!(
            config("http://monasca:5607/", "v3.0").endpoint(),
            "http://monasca:5607/v3.0"
        );
    }

    #[test]
    fn endpoint_keeps_existing_version() {
        assert_eq!(
            config("http://monasca:5607/v3.0", "v3.0").endpoint(),
            "http://monasca:5607/v3.0"
        );
    }

    #[test]
    fn endpoint_without_version() {
        assert_eq!(
            config("https://logs.example.com/intake", "").endpoint(),
            "https://logs.example.com/intake"
        );
    }

    #[test]
    fn rejects_token_with_newline() {
        let cfg = HttpTransportConfig {
            auth_token: Some("bad\ntoken".to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            HttpTransport::new(&cfg),
            Err(TransportError::Request(_))
        ));
    }

    #[tokio::test]
    async fn posts_json_with_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v3.0/logs")
            .match_header("content-type", "application/json")
            .match_header("x-auth-token", "secret")
            .match_header("user-agent", "logfwd-test")
            .match_body(r#"{"logs":["a"]}"#)
            .with_status(204)
            .create_async()
            .await;

        let cfg = HttpTransportConfig {
            url: server.url(),
            version: "v3.0".to_owned(),
            auth_token: Some("secret".to_owned()),
            request_timeout: Duration::from_secs(5),
            user_agent: "logfwd-test".to_owned(),
        };
        let transport = HttpTransport::new(&cfg).unwrap();
        transport
            .send("/logs", Bytes::from_static(br#"{"logs":["a"]}"#))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn maps_error_statuses() {
        let mut server = mockito::Server::new_async().await;
        let _unavailable = server
            .mock("POST", "/v3.0/logs")
            .with_status(503)
            .with_body("try later")
            .create_async()
            .await;
        let _denied = server
            .mock("POST", "/v3.0/denied")
            .with_status(401)
            .create_async()
            .await;

        let transport = HttpTransport::new(&config(&server.url(), "v3.0")).unwrap();

        let err = transport
            .send("/logs", Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                status: 503,
                body: "try later".to_owned()
            }
        );

        let err = transport
            .send("/denied", Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::Unauthorized { status: 401 });
    }

    #[tokio::test]
    async fn connection_refused_is_connection_error() {
        // 바인드 후 즉시 닫아 아무도 듣지 않는 포트를 얻는다.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(&config(&format!("http://{addr}"), "")).unwrap();
        let err = transport
            .send("/logs", Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)), "{err:?}");
    }
}
