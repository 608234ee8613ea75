//! 플러시 정책 -- 크기/시간 이중 트리거
//!
//! 평가 순서:
//! 1. 엔트리가 0개면 플러시하지 않음
//! 2. `entry_count >= size_threshold`이면 [`FlushTrigger::Size`]
//! 3. `elapsed > time_threshold`이면 [`FlushTrigger::Time`]
//! 4. 그 외에는 보류
//!
//! 두 조건이 동시에 성립하면 크기 트리거가 선택되어 휴지 없는 경로를 탑니다.
//! 크기는 도달 즉시(`>=`), 시간은 초과했을 때만(`>`) 트리거됩니다.

use std::fmt;
use std::time::Duration;

/// 플러시 원인
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushTrigger {
    /// 엔트리 수가 배치 크기에 도달
    Size,
    /// 배치 윈도우가 플러시 간격을 초과
    Time,
    /// 입력 종료 시 남은 배치 전송
    Drain,
}

impl FlushTrigger {
    /// 메트릭 레이블 및 로그용 이름을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Time => "time",
            Self::Drain => "drain",
        }
    }
}

impl fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 플러시 정책 평가 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushDecision {
    /// 계속 누적
    Hold,
    /// 지금 플러시
    Flush(FlushTrigger),
}

impl FlushDecision {
    /// 플러시해야 하는지 반환합니다.
    pub fn should_flush(&self) -> bool {
        matches!(self, Self::Flush(_))
    }

    /// 플러시 원인을 반환합니다. 보류면 `None`입니다.
    pub fn trigger(&self) -> Option<FlushTrigger> {
        match self {
            Self::Hold => None,
            Self::Flush(trigger) => Some(*trigger),
        }
    }
}

/// 현재 배치 상태로 플러시 여부를 결정합니다.
pub fn decide(
    entry_count: usize,
    elapsed: Duration,
    time_threshold: Duration,
    size_threshold: usize,
) -> FlushDecision {
    if entry_count == 0 {
        FlushDecision::Hold
    } else if entry_count >= size_threshold {
        FlushDecision::Flush(FlushTrigger::Size)
    } else if elapsed > time_threshold {
        FlushDecision::Flush(FlushTrigger::Time)
    } else {
        FlushDecision::Hold
    }
}

/// 임계값을 보관하는 플러시 정책
#[derive(Debug, Clone, Copy)]
pub struct FlushPolicy {
    size_threshold: usize,
    time_threshold: Duration,
}

impl FlushPolicy {
    /// 새 정책을 생성합니다.
    pub fn new(size_threshold: usize, time_threshold: Duration) -> Self {
        Self {
            size_threshold,
            time_threshold,
        }
    }

    /// 크기 임계값을 반환합니다.
    pub fn size_threshold(&self) -> usize {
        self.size_threshold
    }

    /// 시간 임계값을 반환합니다.
    pub fn time_threshold(&self) -> Duration {
        self.time_threshold
    }

    /// [`decide`]를 보관된 임계값으로 호출합니다.
    pub fn decide(&self, entry_count: usize, elapsed: Duration) -> FlushDecision {
        decide(
            entry_count,
            elapsed,
            self.time_threshold,
            self.size_threshold,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_SECS: Duration = Duration::from_secs(10);

    #[test]
    fn empty_batch_never_flushes() {
        assert_eq!(decide(0, Duration::from_secs(3600), TEN_SECS, 1), FlushDecision::Hold);
        assert_eq!(decide(0, Duration::ZERO, TEN_SECS, 100), FlushDecision::Hold);
    }

    #[test]
    fn size_triggers_at_threshold() {
        assert_eq!(
            decide(3, Duration::ZERO, TEN_SECS, 3),
            FlushDecision::Flush(FlushTrigger::Size)
        );
        assert_eq!(decide(2, Duration::ZERO, TEN_SECS, 3), FlushDecision::Hold);
    }

    #[test]
    fn time_triggers_only_when_exceeded() {
        assert_eq!(decide(1, TEN_SECS, TEN_SECS, 100), FlushDecision::Hold);
        assert_eq!(
            decide(1, TEN_SECS + Duration::from_millis(1), TEN_SECS, 100),
            FlushDecision::Flush(FlushTrigger::Time)
        );
    }

    #[test]
    fn size_wins_when_both_hold() {
        let decision = decide(100, Duration::from_secs(60), TEN_SECS, 100);
        assert_eq!(decision, FlushDecision::Flush(FlushTrigger::Size));
    }

    #[test]
    fn decision_accessors() {
        assert!(!FlushDecision::Hold.should_flush());
        assert_eq!(FlushDecision::Hold.trigger(), None);

        let flush = FlushDecision::Flush(FlushTrigger::Time);
        assert!(flush.should_flush());
        assert_eq!(flush.trigger(), Some(FlushTrigger::Time));
    }

    #[test]
    fn policy_uses_stored_thresholds() {
        let policy = FlushPolicy::new(3, Duration::from_secs(2));
        assert_eq!(policy.size_threshold(), 3);
        assert_eq!(
            policy.decide(1, Duration::from_secs(3)),
            FlushDecision::Flush(FlushTrigger::Time)
        );
        assert_eq!(policy.decide(1, Duration::from_secs(1)), FlushDecision::Hold);
    }

    #[test]
    fn trigger_labels() {
        assert_eq!(FlushTrigger::Size.to_string(), "size");
        assert_eq!(FlushTrigger::Time.as_str(), "time");
        assert_eq!(FlushTrigger::Drain.as_str(), "drain");
    }
}
