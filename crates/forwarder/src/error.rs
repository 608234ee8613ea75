//! 포워더 에러 타입
//!
//! [`ForwarderError`]는 포워더 엔진 내부에서 발생하는 에러를 표현합니다.
//! `From<ForwarderError> for LogfwdError` 변환이 구현되어 있어
//! 데몬에서 `?` 연산자로 전파할 수 있습니다.
//!
//! 전송 실패([`TransportError`])는 전송 파이프라인 안에서 재시도로 흡수되므로
//! 정상 동작 중에는 호출자에게 올라오지 않습니다.

use logfwd_core::error::LogfwdError;

use crate::transport::TransportError;

/// 포워더 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    /// 입력 라인이 "문자열 -> 배열" 형태의 JSON 객체가 아님
    #[error("malformed input line: {reason}")]
    MalformedInput {
        /// 디코딩 실패 사유
        reason: String,
    },

    /// 배치 직렬화 실패
    #[error("failed to serialize batch: {0}")]
    Serialize(#[source] serde_json::Error),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 전송 계층 초기화 에러
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// 입력 스트림 I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ForwarderError> for LogfwdError {
    fn from(err: ForwarderError) -> Self {
        match err {
            ForwarderError::Io(e) => LogfwdError::Io(e),
            other => LogfwdError::Forwarder(other.to_string()),
        }
    }
}
