//! 입력 라인 소스 -- 타임아웃 기반 줄 단위 폴링
//!
//! [`LineSource`]는 비동기 입력 스트림(일반적으로 stdin)을 감싸고
//! [`LogEvent`]를 한 번에 하나씩 생성합니다.
//!
//! - 완성된 라인이 있으면 [`LogEvent::Data`]
//! - 타임아웃 안에 완성된 라인이 없으면 [`LogEvent::Idle`]
//! - 스트림이 닫히면 [`LogEvent::EndOfStream`] (이후 호출도 계속 동일)
//!
//! `Idle` 이벤트 덕분에 생산자가 조용할 때도 드라이버 루프가 시간 기반 플러시
//! 조건을 주기적으로 평가할 수 있습니다. 대기는 `tokio::time::timeout_at`으로
//! 제한된 비동기 읽기이며 바쁜 폴링을 하지 않습니다.

use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Instant, timeout_at};

use crate::error::ForwarderError;

/// 라인 소스가 생성하는 읽기 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// 공백이 아닌 한 줄 (앞뒤 공백 및 개행 제거됨)
    Data(Bytes),
    /// 타임아웃 동안 완성된 라인이 없음
    Idle,
    /// 입력 스트림 종료
    EndOfStream,
}

/// 줄 단위 비동기 입력 소스
///
/// 타임아웃으로 중단된 부분 라인은 내부 버퍼에 보존되었다가
/// 다음 호출에서 이어서 완성됩니다.
pub struct LineSource<R> {
    /// 원시 입력 스트림
    reader: R,
    /// 아직 개행을 만나지 못한 부분 라인
    pending: Vec<u8>,
    /// EOF 도달 여부
    drained: bool,
}

impl<R> LineSource<R>
where
    R: AsyncBufRead + Unpin,
{
    /// 새 라인 소스를 생성합니다.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            drained: false,
        }
    }

    /// EOF에 도달했는지 반환합니다.
    pub fn is_drained(&self) -> bool {
        self.drained
    }

    /// 최대 `timeout` 동안 다음 이벤트를 기다립니다.
    ///
    /// 빈 줄은 건너뛰되 대기 마감 시각은 연장하지 않습니다.
    /// 개행 없이 끝나는 마지막 라인은 `Data`로 내보낸 뒤 `EndOfStream`을 반환합니다.
    ///
    /// # Errors
    /// 입력 스트림 읽기 실패 시 [`ForwarderError::Io`]를 반환합니다.
    pub async fn next_event(&mut self, timeout: Duration) -> Result<LogEvent, ForwarderError> {
        if self.drained {
            return Ok(LogEvent::EndOfStream);
        }

        let deadline = Instant::now() + timeout;

        loop {
            // read_until은 읽은 바이트를 즉시 pending에 덧붙이므로
            // 타임아웃으로 future가 드롭되어도 부분 라인이 유실되지 않는다.
            let read = timeout_at(
                deadline,
                self.reader.read_until(b'\n', &mut self.pending),
            )
            .await;

            match read {
                Err(_elapsed) => return Ok(LogEvent::Idle),
                Ok(Err(e)) => return Err(ForwarderError::Io(e)),
                Ok(Ok(0)) => {
                    self.drained = true;
                    return Ok(match self.take_line() {
                        Some(line) => LogEvent::Data(line),
                        None => LogEvent::EndOfStream,
                    });
                }
                Ok(Ok(_)) => {
                    if !self.pending.ends_with(b"\n") {
                        // 개행 없이 읽기가 끝났다면 다음 읽기에서 EOF가 확인된다.
                        continue;
                    }
                    if let Some(line) = self.take_line() {
                        return Ok(LogEvent::Data(line));
                    }
                }
            }
        }
    }

    /// 부분 라인 버퍼를 비우고 공백을 제거한 라인을 반환합니다.
    fn take_line(&mut self) -> Option<Bytes> {
        let line = std::mem::take(&mut self.pending);
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            None
        } else {
            Some(Bytes::copy_from_slice(trimmed))
        }
    }
}
