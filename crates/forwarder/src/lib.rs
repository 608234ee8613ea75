#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`source`]: 줄 단위 입력 읽기 (poll 타임아웃 시 `Idle` 이벤트)
//! - [`batch`]: 키별 엔트리 배치 누적
//! - [`policy`]: 크기/시간 기반 플러시 결정
//! - [`delivery`]: 고정 간격 무한 재시도 전송
//! - [`pacing`]: 시간 트리거 플러시 후 휴지
//! - [`transport`]: 전송 계층 trait 및 HTTP 구현
//! - [`forwarder`]: 전체 드라이버 루프
//! - [`config`]: 포워더 설정 (core 설정 변환)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! stdin -> LineSource -> LogBatch -> FlushPolicy -> DeliveryPipeline -> Transport
//!                                        |                                 |
//!                                      Pacer                          Log API (HTTP)
//! ```

pub mod batch;
pub mod config;
pub mod delivery;
pub mod error;
pub mod forwarder;
pub mod pacing;
pub mod policy;
pub mod source;
pub mod transport;

// --- 주요 타입 re-export ---

// 드라이버
pub use forwarder::{Forwarder, ForwarderBuilder, ForwarderStats};

// 설정
pub use config::{ForwarderConfig, ForwarderConfigBuilder, LOGS_PATH};

// 에러
pub use error::ForwarderError;

// 구성 요소
pub use batch::LogBatch;
pub use delivery::{DeliveryPipeline, DeliveryReport};
pub use pacing::Pacer;
pub use policy::{FlushDecision, FlushPolicy, FlushTrigger};
pub use source::{LineSource, LogEvent};

// 전송
pub use transport::{HttpTransport, HttpTransportConfig, Transport, TransportError};
