//! 전송 파이프라인 -- 성공할 때까지 고정 간격 재시도
//!
//! 배치는 한 번 만들어지면 반드시 전달되어야 합니다. [`DeliveryPipeline::deliver`]는
//! 실패를 호출자에게 돌려주지 않고, 동일한 본문으로 `retry_delay` 간격마다
//! 재시도합니다. 최대 횟수나 지수 백오프는 없습니다.
//!
//! 재시도 중에는 드라이버 루프가 막히므로 새 입력은 상류(파이프 버퍼)에 쌓입니다.

use std::time::Duration;

use bytes::Bytes;
use metrics::{counter, histogram};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::duration_ms;
use crate::transport::{Transport, TransportError};

/// 한 배치의 전달 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// 성공까지의 전송 시도 횟수 (성공한 시도 포함)
    pub attempts: u32,
    /// 첫 시도부터 성공까지 걸린 시간
    pub elapsed: Duration,
}

/// 전송 계층 위의 무한 재시도 파이프라인
pub struct DeliveryPipeline<T> {
    transport: T,
    path: String,
    retry_delay: Duration,
}

impl<T: Transport> DeliveryPipeline<T> {
    /// 새 전송 파이프라인을 생성합니다.
    pub fn new(transport: T, path: impl Into<String>, retry_delay: Duration) -> Self {
        Self {
            transport,
            path: path.into(),
            retry_delay,
        }
    }

    /// 재시도 간격을 반환합니다.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// 전송 계층에 대한 참조를 반환합니다.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 단일 전송을 시도합니다.
    pub async fn try_deliver(&self, body: &Bytes) -> Result<(), TransportError> {
        self.transport.send(&self.path, body.clone()).await
    }

    /// 본문이 전달될 때까지 재시도합니다.
    ///
    /// 반환 시점에는 항상 전송이 성공한 상태입니다.
    pub async fn deliver(&self, body: Bytes) -> DeliveryReport {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            match self.try_deliver(&body).await {
                Ok(()) => {
                    let elapsed = started.elapsed();
                    histogram!(logfwd_core::metrics::DELIVERY_DURATION_SECONDS)
                        .record(elapsed.as_secs_f64());
                    debug!(
                        attempts,
                        bytes = body.len(),
                        elapsed_ms = duration_ms(elapsed),
                        "batch delivered"
                    );
                    return DeliveryReport { attempts, elapsed };
                }
                Err(e) => {
                    counter!(logfwd_core::metrics::DELIVERY_FAILURES_TOTAL).increment(1);
                    warn!(
                        error = %e,
                        attempt = attempts,
                        retry_in_ms = duration_ms(self.retry_delay),
                        "batch delivery failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}
