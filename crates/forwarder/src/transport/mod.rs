//! 인증된 전송 계층 추상화
//!
//! 포워더 엔진은 [`Transport`] trait의 `send` 하나만 호출합니다.
//! 엔드포인트 결정, 자격 증명, 연결 관리는 구현체가 책임집니다.
//!
//! ```text
//! DeliveryPipeline
//!        │
//!        ▼
//!   ┌──────────┐
//!   │Transport │ (trait)
//!   └──────────┘
//!     │      │
//!     ▼      ▼
//!  ┌────┐ ┌──────┐
//!  │Http│ │ Mock │
//!  └─┬──┘ └──────┘
//!    ▼
//!  Log API
//! ```

pub mod http;

pub use http::{HttpTransport, HttpTransportConfig};

use std::future::Future;

use bytes::Bytes;

/// 단일 전송 시도의 실패
///
/// 어떤 변형이든 전송 파이프라인은 동일한 본문으로 재시도합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// 연결 실패 (거부, DNS 실패 등)
    #[error("connection failed: {0}")]
    Connection(String),

    /// 요청 타임아웃
    #[error("request timed out")]
    Timeout,

    /// 인증 거부 (401/403)
    #[error("unauthorized: status {status}")]
    Unauthorized {
        /// HTTP 상태 코드
        status: u16,
    },

    /// 2xx가 아닌 응답
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문 (잘림)
        body: String,
    },

    /// 요청 구성 또는 기타 클라이언트 에러
    #[error("request error: {0}")]
    Request(String),
}

/// 배치 본문을 원격 로그 API로 보내는 전송 계층
///
/// # Errors
/// 전송 실패 시 [`TransportError`]를 반환합니다. 호출자는 실패를 재시도로 처리합니다.
pub trait Transport: Send + Sync {
    /// `path`로 JSON `body`를 전송합니다.
    fn send(
        &self,
        path: &str,
        body: Bytes,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn send(
        &self,
        path: &str,
        body: Bytes,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        (**self).send(path, body)
    }
}
