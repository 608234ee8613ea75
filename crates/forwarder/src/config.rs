//! 포워더 설정
//!
//! [`ForwarderConfig`]는 core의 [`LogForwarderConfig`](logfwd_core::config::LogForwarderConfig)를
//! 엔진이 바로 쓸 수 있는 `Duration` 기반 값으로 변환한 설정입니다.
//! 각 컴포넌트는 생성 시 필요한 값만 복사해 가집니다.
//!
//! # 사용 예시
//! ```ignore
//! use logfwd_core::config::LogfwdConfig;
//! use logfwd_forwarder::config::ForwarderConfig;
//!
//! let core_config = LogfwdConfig::default();
//! let config = ForwarderConfig::from_core(&core_config.forwarder);
//! ```

use std::time::Duration;

use crate::error::ForwarderError;

/// 로그 API의 배치 수신 경로
pub const LOGS_PATH: &str = "/logs";

/// 포워더 엔진 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderConfig {
    /// 크기 트리거 임계값 (엔트리 수, 이상이면 플러시)
    pub batch_size: usize,
    /// 시간 트리거 임계값 (초과하면 플러시)
    pub flush_interval: Duration,
    /// 입력 대기 타임아웃 및 시간 트리거 플러시 후 휴지 시간
    pub poll_interval: Duration,
    /// 전송 재시도 간격
    pub retry_delay: Duration,
    /// 배치를 전송할 경로
    pub path: String,
    /// 라인/유휴 단위 진단 로그 출력 여부 (동작에는 영향 없음)
    pub verbose: bool,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            flush_interval: Duration::from_secs(10),
            poll_interval: Duration::from_secs(10),
            retry_delay: Duration::from_secs(1),
            path: LOGS_PATH.to_owned(),
            verbose: false,
        }
    }
}

impl ForwarderConfig {
    /// core의 `LogForwarderConfig`에서 포워더 설정을 생성합니다.
    pub fn from_core(core: &logfwd_core::config::LogForwarderConfig) -> Self {
        Self {
            batch_size: core.batch_size,
            flush_interval: Duration::from_secs(core.flush_interval_secs),
            poll_interval: Duration::from_secs(core.poll_interval_secs),
            retry_delay: Duration::from_secs(core.retry_delay_secs),
            verbose: core.verbose,
            ..Self::default()
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ForwarderError> {
        if self.batch_size == 0 {
            return Err(config_error("batch_size", "must be greater than 0"));
        }
        if self.flush_interval.is_zero() {
            return Err(config_error("flush_interval", "must be greater than 0"));
        }
        if self.poll_interval.is_zero() {
            return Err(config_error("poll_interval", "must be greater than 0"));
        }
        if self.retry_delay.is_zero() {
            return Err(config_error("retry_delay", "must be greater than 0"));
        }
        if !self.path.starts_with('/') {
            return Err(config_error("path", "must start with '/'"));
        }
        Ok(())
    }
}

/// 로그 필드용 밀리초 값. `u64` 범위를 넘으면 `u64::MAX`로 고정됩니다.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn config_error(field: &str, reason: &str) -> ForwarderError {
    ForwarderError::Config {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}

/// 포워더 설정 빌더
#[derive(Default)]
pub struct ForwarderConfigBuilder {
    config: ForwarderConfig,
}

impl ForwarderConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 크기 트리거 임계값을 설정합니다.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// 시간 트리거 임계값을 설정합니다.
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    /// 폴링 간격을 설정합니다.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// 재시도 간격을 설정합니다.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// 전송 경로를 설정합니다.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.path = path.into();
        self
    }

    /// 진단 로그 여부를 설정합니다.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// 설정을 검증하고 `ForwarderConfig`를 생성합니다.
    pub fn build(self) -> Result<ForwarderConfig, ForwarderError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_ms_saturates() {
        assert_eq!(duration_ms(Duration::from_millis(1500)), 1500);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn default_config_is_valid() {
        ForwarderConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_converts_seconds() {
        let core = logfwd_core::config::LogForwarderConfig {
            batch_size: 250,
            flush_interval_secs: 5,
            poll_interval_secs: 2,
            retry_delay_secs: 3,
            verbose: true,
        };
        let config = ForwarderConfig::from_core(&core);
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.flush_interval, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.retry_delay, Duration::from_secs(3));
        assert!(config.verbose);
        assert_eq!(config.path, LOGS_PATH);
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let config = ForwarderConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_durations() {
        let config = ForwarderConfig {
            retry_delay: Duration::ZERO,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retry_delay"));
    }

    #[test]
    fn validate_rejects_relative_path() {
        let config = ForwarderConfig {
            path: "logs".to_owned(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = ForwarderConfigBuilder::new()
            .batch_size(3)
            .flush_interval(Duration::from_secs(2))
            .poll_interval(Duration::from_millis(500))
            .build()
            .unwrap();
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.flush_interval, Duration::from_secs(2));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        assert!(ForwarderConfigBuilder::new().batch_size(0).build().is_err());
    }
}
