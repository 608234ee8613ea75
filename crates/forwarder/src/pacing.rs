//! 전송 후 휴지 제어
//!
//! 크기 트리거 플러시는 버스트 중에 발생하므로 쉬지 않고 바로 다음 읽기로 넘어갑니다.
//! 시간 트리거 플러시 뒤에는 `poll_interval`만큼 쉬어 작은 배치가 과도하게
//! 전송되는 것을 막습니다.

use std::time::Duration;

use crate::config::duration_ms;
use crate::policy::FlushTrigger;

/// 플러시 원인에 따라 휴지 여부를 결정하는 컨트롤러
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    poll_interval: Duration,
}

impl Pacer {
    /// 새 컨트롤러를 생성합니다.
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// 주어진 트리거에 대해 쉬어야 할 시간을 반환합니다.
    pub fn delay_for(&self, trigger: FlushTrigger) -> Duration {
        match trigger {
            FlushTrigger::Time => self.poll_interval,
            FlushTrigger::Size | FlushTrigger::Drain => Duration::ZERO,
        }
    }

    /// 필요하면 휴지하고, 실제로 쉰 시간을 반환합니다.
    pub async fn pace(&self, trigger: FlushTrigger) -> Duration {
        let delay = self.delay_for(trigger);
        if !delay.is_zero() {
            tracing::debug!(
                delay_ms = duration_ms(delay),
                trigger = %trigger,
                "pacing before next poll"
            );
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
