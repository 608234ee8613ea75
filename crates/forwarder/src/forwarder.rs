//! 드라이버 루프 -- 읽기/누적/플러시/전송/휴지의 전체 흐름을 관리합니다.
//!
//! # 상태 전이
//! ```text
//! Idle ──Data──▶ Accumulating ──policy──▶ Flushing ──▶ Idle
//!   ▲                 │                                   │
//!   └─────Idle────────┘            EndOfStream ──▶ Drained (남은 배치 전송 후 종료)
//! ```
//!
//! 이벤트를 하나 처리할 때마다 플러시 정책을 평가합니다. `Idle` 이벤트는
//! 입력이 없을 때 시간 기반 플러시를 재평가하기 위해서만 존재합니다.

use bytes::Bytes;
use metrics::{counter, gauge};
use tokio::io::AsyncBufRead;
use tracing::{debug, info, warn};

use logfwd_core::metrics as m;

use crate::batch::LogBatch;
use crate::config::{ForwarderConfig, duration_ms};
use crate::delivery::DeliveryPipeline;
use crate::error::ForwarderError;
use crate::pacing::Pacer;
use crate::policy::{FlushDecision, FlushPolicy, FlushTrigger};
use crate::source::{LineSource, LogEvent};
use crate::transport::Transport;

/// 드라이버 루프 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForwarderState {
    /// 입력 대기 중, 배치 비어 있음
    Idle,
    /// 배치에 엔트리 누적 중
    Accumulating,
    /// 배치 전송 중
    Flushing,
    /// 입력 종료, 루프 탈출
    Drained,
}

/// 포워더 실행 통계
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwarderStats {
    /// 읽은 라인 수 (빈 줄 제외)
    pub lines_read: u64,
    /// 디코딩 실패로 건너뛴 라인 수
    pub malformed_lines: u64,
    /// 전달된 엔트리 수
    pub entries_forwarded: u64,
    /// 크기 트리거 플러시 수
    pub size_flushes: u64,
    /// 시간 트리거 플러시 수
    pub time_flushes: u64,
    /// 입력 종료 시 플러시 수
    pub drain_flushes: u64,
    /// 전체 전송 시도 수 (재시도 포함)
    pub delivery_attempts: u64,
}

impl ForwarderStats {
    /// 전체 플러시 수를 반환합니다.
    pub fn batches_flushed(&self) -> u64 {
        self.size_flushes + self.time_flushes + self.drain_flushes
    }
}

/// 로그 포워더 -- 입력 스트림을 배치로 묶어 전송 계층으로 전달합니다.
///
/// # 사용 예시
/// ```ignore
/// use logfwd_forwarder::{ForwarderBuilder, HttpTransport};
///
/// let transport = HttpTransport::new(&transport_config)?;
/// let stdin = tokio::io::BufReader::new(tokio::io::stdin());
/// let forwarder = ForwarderBuilder::new(stdin, transport)
///     .config(config)
///     .build()?;
///
/// let stats = forwarder.run().await?;
/// ```
pub struct Forwarder<R, T> {
    source: LineSource<R>,
    batch: LogBatch,
    policy: FlushPolicy,
    delivery: DeliveryPipeline<T>,
    pacer: Pacer,
    config: ForwarderConfig,
    state: ForwarderState,
    stats: ForwarderStats,
}

impl<R, T> Forwarder<R, T>
where
    R: AsyncBufRead + Unpin,
    T: Transport,
{
    /// 현재 상태 이름을 반환합니다.
    pub fn state_name(&self) -> &str {
        match self.state {
            ForwarderState::Idle => "idle",
            ForwarderState::Accumulating => "accumulating",
            ForwarderState::Flushing => "flushing",
            ForwarderState::Drained => "drained",
        }
    }

    /// 지금까지의 통계를 반환합니다.
    pub fn stats(&self) -> &ForwarderStats {
        &self.stats
    }

    /// 현재 배치에 대한 참조를 반환합니다.
    pub fn batch(&self) -> &LogBatch {
        &self.batch
    }

    /// 입력이 끝날 때까지 루프를 실행하고 통계를 반환합니다.
    ///
    /// # Errors
    /// 입력 스트림 I/O 실패 또는 배치 직렬화 실패 시 에러를 반환합니다.
    /// 전송 실패는 재시도로 흡수되어 반환되지 않습니다.
    pub async fn run(mut self) -> Result<ForwarderStats, ForwarderError> {
        info!(
            batch_size = self.config.batch_size,
            flush_interval_ms = duration_ms(self.config.flush_interval),
            poll_interval_ms = duration_ms(self.config.poll_interval),
            "forwarder started"
        );

        while self.state != ForwarderState::Drained {
            self.step().await?;
        }

        info!(
            lines_read = self.stats.lines_read,
            entries_forwarded = self.stats.entries_forwarded,
            batches_flushed = self.stats.batches_flushed(),
            malformed_lines = self.stats.malformed_lines,
            "input drained, forwarder stopped"
        );
        Ok(self.stats)
    }

    /// 이벤트 하나를 처리하고 플러시 정책을 평가합니다.
    pub async fn step(&mut self) -> Result<(), ForwarderError> {
        if self.state == ForwarderState::Drained {
            return Ok(());
        }

        match self.source.next_event(self.config.poll_interval).await? {
            LogEvent::Data(raw) => self.accumulate(&raw),
            LogEvent::Idle => {
                if self.config.verbose {
                    debug!(
                        poll_interval_ms = duration_ms(self.config.poll_interval),
                        pending_entries = self.batch.entry_count(),
                        "no input within poll interval"
                    );
                }
            }
            LogEvent::EndOfStream => {
                if !self.batch.is_empty() {
                    self.flush(FlushTrigger::Drain).await?;
                }
                self.state = ForwarderState::Drained;
                return Ok(());
            }
        }

        if let FlushDecision::Flush(trigger) = self
            .policy
            .decide(self.batch.entry_count(), self.batch.elapsed())
        {
            self.flush(trigger).await?;
            self.pacer.pace(trigger).await;
        }

        Ok(())
    }

    fn accumulate(&mut self, raw: &Bytes) {
        self.stats.lines_read += 1;
        counter!(m::LINES_READ_TOTAL).increment(1);
        if self.config.verbose {
            debug!(line = %String::from_utf8_lossy(raw), "received line");
        }

        match self.batch.merge(raw) {
            Ok(added) => {
                if !self.batch.is_empty() {
                    self.state = ForwarderState::Accumulating;
                }
                gauge!(m::BATCH_ENTRIES).set(self.batch.entry_count() as f64);
                if self.config.verbose {
                    debug!(
                        added,
                        pending_entries = self.batch.entry_count(),
                        "merged line into batch"
                    );
                }
            }
            Err(e) => {
                self.stats.malformed_lines += 1;
                counter!(m::MALFORMED_LINES_TOTAL).increment(1);
                warn!(error = %e, bytes = raw.len(), "skipping malformed log line");
            }
        }
    }

    async fn flush(&mut self, trigger: FlushTrigger) -> Result<(), ForwarderError> {
        // 직렬화에 실패하면 배치는 그대로 남는다.
        let body = self.batch.to_body()?;
        let entries = self.batch.entry_count();
        let elapsed = self.batch.elapsed();
        self.batch.take();
        self.state = ForwarderState::Flushing;

        info!(
            trigger = %trigger,
            entries,
            bytes = body.len(),
            elapsed_ms = duration_ms(elapsed),
            "flushing batch"
        );

        let report = self.delivery.deliver(body).await;

        self.stats.entries_forwarded += entries as u64;
        self.stats.delivery_attempts += u64::from(report.attempts);
        match trigger {
            FlushTrigger::Size => self.stats.size_flushes += 1,
            FlushTrigger::Time => self.stats.time_flushes += 1,
            FlushTrigger::Drain => self.stats.drain_flushes += 1,
        }

        counter!(m::ENTRIES_FORWARDED_TOTAL).increment(entries as u64);
        counter!(m::BATCHES_FLUSHED_TOTAL, m::LABEL_TRIGGER => trigger.as_str()).increment(1);
        gauge!(m::BATCH_ENTRIES).set(0.0);

        if report.attempts > 1 {
            info!(
                attempts = report.attempts,
                elapsed_ms = duration_ms(report.elapsed),
                "batch delivered after retries"
            );
        }

        self.state = ForwarderState::Idle;
        Ok(())
    }
}

/// 포워더 빌더
///
/// 설정을 검증하고 각 컴포넌트에 필요한 값만 나눠 줍니다.
pub struct ForwarderBuilder<R, T> {
    reader: R,
    transport: T,
    config: ForwarderConfig,
}

impl<R, T> ForwarderBuilder<R, T>
where
    R: AsyncBufRead + Unpin,
    T: Transport,
{
    /// 입력 스트림과 전송 계층으로 새 빌더를 생성합니다.
    pub fn new(reader: R, transport: T) -> Self {
        Self {
            reader,
            transport,
            config: ForwarderConfig::default(),
        }
    }

    /// 포워더 설정을 지정합니다.
    pub fn config(mut self, config: ForwarderConfig) -> Self {
        self.config = config;
        self
    }

    /// 포워더를 빌드합니다.
    pub fn build(self) -> Result<Forwarder<R, T>, ForwarderError> {
        self.config.validate()?;

        let config = self.config;
        Ok(Forwarder {
            source: LineSource::new(self.reader),
            batch: LogBatch::new(),
            policy: FlushPolicy::new(config.batch_size, config.flush_interval),
            delivery: DeliveryPipeline::new(
                self.transport,
                config.path.clone(),
                config.retry_delay,
            ),
            pacer: Pacer::new(config.poll_interval),
            config,
            state: ForwarderState::Idle,
            stats: ForwarderStats::default(),
        })
    }
}
