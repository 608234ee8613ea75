//! 설정 관리 -- logfwd.toml 파싱 및 런타임 설정
//!
//! [`LogfwdConfig`]는 모든 컴포넌트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선, 데몬에서 적용)
//! 2. 환경변수 (`LOGFWD_FORWARDER_BATCH_SIZE=500` 형식)
//! 3. 설정 파일 (`logfwd.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logfwd_core::error::LogfwdError> {
//! use logfwd_core::config::LogfwdConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogfwdConfig::load("logfwd.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogfwdConfig::parse("[forwarder]\nbatch_size = 500")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogfwdError};

/// logfwd 통합 설정
///
/// `logfwd.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogfwdConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 배치/전송 엔진 설정
    #[serde(default)]
    pub forwarder: LogForwarderConfig,
    /// 로그 API 엔드포인트 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// Prometheus 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogfwdConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogfwdError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogfwdError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogfwdError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogfwdError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogfwdError> {
        toml::from_str(toml_str).map_err(|e| {
            LogfwdError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGFWD_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGFWD_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGFWD_GENERAL_LOG_FORMAT");

        // Forwarder
        override_usize(
            &mut self.forwarder.batch_size,
            "LOGFWD_FORWARDER_BATCH_SIZE",
        );
        override_u64(
            &mut self.forwarder.flush_interval_secs,
            "LOGFWD_FORWARDER_FLUSH_INTERVAL_SECS",
        );
        override_u64(
            &mut self.forwarder.poll_interval_secs,
            "LOGFWD_FORWARDER_POLL_INTERVAL_SECS",
        );
        override_u64(
            &mut self.forwarder.retry_delay_secs,
            "LOGFWD_FORWARDER_RETRY_DELAY_SECS",
        );
        override_bool(&mut self.forwarder.verbose, "LOGFWD_FORWARDER_VERBOSE");

        // API
        override_string(&mut self.api.url, "LOGFWD_API_URL");
        override_string(&mut self.api.version, "LOGFWD_API_VERSION");
        override_opt_string(&mut self.api.auth_token, "LOGFWD_API_AUTH_TOKEN");
        override_u64(
            &mut self.api.request_timeout_secs,
            "LOGFWD_API_REQUEST_TIMEOUT_SECS",
        );
        override_string(&mut self.api.user_agent, "LOGFWD_API_USER_AGENT");

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGFWD_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "LOGFWD_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "LOGFWD_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogfwdError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        self.forwarder.validate()?;
        self.api.validate()?;

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                return Err(invalid("metrics.port", "must be greater than 0"));
            }
            if self.metrics.endpoint != "/metrics" {
                return Err(invalid(
                    "metrics.endpoint",
                    "only '/metrics' is currently supported",
                ));
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 배치/전송 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogForwarderConfig {
    /// 배치 크기 (이 개수 이상 쌓이면 즉시 플러시)
    pub batch_size: usize,
    /// 배치 플러시 간격 (초). 이 시간을 초과하면 플러시
    pub flush_interval_secs: u64,
    /// 입력 대기 타임아웃이자 시간 트리거 플러시 후 휴지 시간 (초)
    pub poll_interval_secs: u64,
    /// 전송 실패 시 재시도 간격 (초)
    pub retry_delay_secs: u64,
    /// 라인/유휴 단위 진단 로그 출력 여부
    pub verbose: bool,
}

impl Default for LogForwarderConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            flush_interval_secs: 10,
            poll_interval_secs: 10,
            retry_delay_secs: 1,
            verbose: false,
        }
    }
}

impl LogForwarderConfig {
    fn validate(&self) -> Result<(), LogfwdError> {
        const MAX_BATCH_SIZE: usize = 1_000_000;
        const MAX_INTERVAL_SECS: u64 = 3600;

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(invalid(
                "forwarder.batch_size",
                format!("must be 1-{MAX_BATCH_SIZE}"),
            ));
        }

        for (field, value) in [
            ("forwarder.flush_interval_secs", self.flush_interval_secs),
            ("forwarder.poll_interval_secs", self.poll_interval_secs),
            ("forwarder.retry_delay_secs", self.retry_delay_secs),
        ] {
            if value == 0 || value > MAX_INTERVAL_SECS {
                return Err(invalid(field, format!("must be 1-{MAX_INTERVAL_SECS}")));
            }
        }

        Ok(())
    }
}

/// 로그 API 엔드포인트 설정
///
/// 엔드포인트 탐색과 토큰 발급은 외부에서 처리하고, 여기에는 결과값만 기록합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 로그 API 기본 URL (예: `http://monasca:5607`)
    pub url: String,
    /// URL 끝에 붙일 API 버전 경로. 빈 문자열이면 붙이지 않음
    pub version: String,
    /// `X-Auth-Token` 헤더로 보낼 정적 토큰
    pub auth_token: Option<String>,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// User-Agent 헤더
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5607".to_owned(),
            version: "v3.0".to_owned(),
            auth_token: None,
            request_timeout_secs: 30,
            user_agent: "logfwd".to_owned(),
        }
    }
}

impl ApiConfig {
    fn validate(&self) -> Result<(), LogfwdError> {
        if self.url.is_empty() {
            return Err(invalid("api.url", "must not be empty"));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(invalid(
                "api.url",
                format!("'{}' must start with http:// or https://", self.url),
            ));
        }
        if self.version.contains('/') {
            return Err(invalid("api.version", "must be a single path segment"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("api.request_timeout_secs", "must be greater than 0"));
        }
        Ok(())
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 메트릭 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9102,
            endpoint: "/metrics".to_owned(),
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> LogfwdError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = if val.is_empty() { None } else { Some(val) };
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = LogfwdConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.forwarder.batch_size, 100);
        assert_eq!(config.forwarder.flush_interval_secs, 10);
        assert_eq!(config.forwarder.retry_delay_secs, 1);
        assert_eq!(config.api.version, "v3.0");
        assert!(config.api.auth_token.is_none());
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn default_config_passes_validation() {
        LogfwdConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = LogfwdConfig::parse("").unwrap();
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.api.url, "http://localhost:5607");
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[forwarder]
batch_size = 250
verbose = true

[api]
url = "https://logs.example.com"
auth_token = "secret"
"#;
        let config = LogfwdConfig::parse(toml).unwrap();
        assert_eq!(config.forwarder.batch_size, 250);
        assert!(config.forwarder.verbose);
        // 나머지는 기본값 유지
        assert_eq!(config.forwarder.poll_interval_secs, 10);
        assert_eq!(config.api.url, "https://logs.example.com");
        assert_eq!(config.api.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.api.user_agent, "logfwd");
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = LogfwdConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            LogfwdError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = LogfwdConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let mut config = LogfwdConfig::default();
        config.forwarder.batch_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn validate_rejects_zero_intervals() {
        for field in ["flush_interval_secs", "poll_interval_secs", "retry_delay_secs"] {
            let mut config = LogfwdConfig::default();
            match field {
                "flush_interval_secs" => config.forwarder.flush_interval_secs = 0,
                "poll_interval_secs" => config.forwarder.poll_interval_secs = 0,
                _ => config.forwarder.retry_delay_secs = 0,
            }
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(field), "{field}: {err}");
        }
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let mut config = LogfwdConfig::default();
        config.api.url = "ftp://logs.example.com".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.url"));
    }

    #[test]
    fn validate_rejects_empty_url() {
        let mut config = LogfwdConfig::default();
        config.api.url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_checks_metrics_only_when_enabled() {
        let mut config = LogfwdConfig::default();
        config.metrics.endpoint = "/stats".to_owned();
        config.validate().unwrap();

        config.metrics.enabled = true;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("metrics.endpoint"));
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 고유한 변수명을 사용하며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_LOGFWD_STR", "overridden") };
        override_string(&mut val, "TEST_LOGFWD_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_LOGFWD_STR") };
    }

    #[test]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: 고유한 변수명을 사용하며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_LOGFWD_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_LOGFWD_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_LOGFWD_BOOL_BAD") };
    }

    #[test]
    fn env_override_empty_token_clears_option() {
        let mut val = Some("old".to_owned());
        // SAFETY: 고유한 변수명을 사용하며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_LOGFWD_TOKEN_EMPTY", "") };
        override_opt_string(&mut val, "TEST_LOGFWD_TOKEN_EMPTY");
        assert!(val.is_none());
        unsafe { std::env::remove_var("TEST_LOGFWD_TOKEN_EMPTY") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = 42usize;
        override_usize(&mut val, "TEST_LOGFWD_NONEXISTENT_12345");
        assert_eq!(val, 42);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let mut config = LogfwdConfig::default();
        config.api.auth_token = Some("token".to_owned());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = LogfwdConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.forwarder.batch_size, config.forwarder.batch_size);
        assert_eq!(parsed.api.auth_token, config.api.auth_token);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = LogfwdConfig::from_file("/nonexistent/path/logfwd.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LogfwdError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
