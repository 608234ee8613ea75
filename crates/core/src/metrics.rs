//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 포워더는 이 상수로 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logfwd_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logfwd_core::metrics::LINES_READ_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 플러시 트리거 레이블 키 (size, time, drain)
pub const LABEL_TRIGGER: &str = "trigger";

// ─── Forwarder 메트릭 ──────────────────────────────────────────────

/// 입력 스트림에서 읽은 라인 수 (counter)
pub const LINES_READ_TOTAL: &str = "logfwd_lines_read_total";

/// JSON 디코딩에 실패해 건너뛴 라인 수 (counter)
pub const MALFORMED_LINES_TOTAL: &str = "logfwd_malformed_lines_total";

/// 원격 API로 전달된 로그 엔트리 수 (counter)
pub const ENTRIES_FORWARDED_TOTAL: &str = "logfwd_entries_forwarded_total";

/// 플러시된 배치 수 (counter, label: trigger)
pub const BATCHES_FLUSHED_TOTAL: &str = "logfwd_batches_flushed_total";

/// 실패한 전송 시도 수 (counter)
pub const DELIVERY_FAILURES_TOTAL: &str = "logfwd_delivery_failures_total";

/// 배치 하나를 성공적으로 전달하기까지 걸린 시간, 재시도 포함 (histogram, 초)
pub const DELIVERY_DURATION_SECONDS: &str = "logfwd_delivery_duration_seconds";

/// 현재 배치에 쌓인 엔트리 수 (gauge)
pub const BATCH_ENTRIES: &str = "logfwd_batch_entries";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(
        LINES_READ_TOTAL,
        "Total number of non-blank lines read from the input stream"
    );
    describe_counter!(
        MALFORMED_LINES_TOTAL,
        "Total number of input lines skipped because they were not a JSON object of arrays"
    );
    describe_counter!(
        ENTRIES_FORWARDED_TOTAL,
        "Total number of log entries delivered to the log API"
    );
    describe_counter!(
        BATCHES_FLUSHED_TOTAL,
        "Total number of batches delivered, by flush trigger"
    );
    describe_counter!(
        DELIVERY_FAILURES_TOTAL,
        "Total number of failed delivery attempts (each is retried)"
    );
    describe_histogram!(
        DELIVERY_DURATION_SECONDS,
        "Time to deliver one batch including retries, in seconds"
    );
    describe_gauge!(
        BATCH_ENTRIES,
        "Number of log entries accumulated in the pending batch"
    );
}
