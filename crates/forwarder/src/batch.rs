//! 배치 누적기 -- 입력 JSON 객체를 하나의 배치로 병합
//!
//! 입력 라인은 `{"<key>": [entry, ...], ...}` 형태의 JSON 객체입니다.
//! [`LogBatch::merge`]는 각 키의 배열 원소를 배치의 같은 키 시퀀스 뒤에
//! 도착 순서대로 덧붙입니다. 엔트리 자체는 불투명한 JSON 값으로 취급합니다.
//!
//! # 불변식
//! - `entry_count() == 모든 시퀀스 길이의 합`
//! - 키와 엔트리는 제거되지 않고 덧붙여지기만 함
//! - 디코딩에 실패한 라인은 배치를 전혀 바꾸지 않음

use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use tokio::time::Instant;

use crate::error::ForwarderError;

/// 인메모리 로그 배치
///
/// 하나의 배치 윈도우 동안 드라이버 루프가 단독으로 소유합니다.
#[derive(Debug, Default)]
pub struct LogBatch {
    /// 키별 로그 엔트리 시퀀스
    entries: BTreeMap<String, Vec<Value>>,
    /// 누적 엔트리 수
    entry_count: usize,
    /// 빈 배치에 첫 엔트리가 들어온 시각
    started_at: Option<Instant>,
}

impl LogBatch {
    /// 빈 배치를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 원시 라인을 디코딩해 배치에 병합하고, 추가된 엔트리 수를 반환합니다.
    ///
    /// # Errors
    /// 라인이 "문자열 -> 배열" JSON 객체가 아니면
    /// [`ForwarderError::MalformedInput`]을 반환하며 배치는 변경되지 않습니다.
    pub fn merge(&mut self, raw: &[u8]) -> Result<usize, ForwarderError> {
        let decoded: BTreeMap<String, Vec<Value>> =
            serde_json::from_slice(raw).map_err(|e| ForwarderError::MalformedInput {
                reason: e.to_string(),
            })?;

        let mut added = 0;
        for (key, values) in decoded {
            added += values.len();
            self.entries.entry(key).or_default().extend(values);
        }

        if added > 0 && self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        self.entry_count += added;

        Ok(added)
    }

    /// 누적 엔트리 수를 반환합니다.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// 엔트리가 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// 배치 윈도우 시작 시각을 반환합니다.
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// 첫 엔트리 이후 경과 시간을 반환합니다. 비어 있으면 0입니다.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|start| start.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 특정 키의 엔트리 시퀀스를 반환합니다.
    pub fn get(&self, key: &str) -> Option<&[Value]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// 배치에 존재하는 키 목록을 반환합니다.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// 배치를 꺼내고 빈 배치로 교체합니다.
    pub fn take(&mut self) -> LogBatch {
        std::mem::take(self)
    }

    /// 배치를 전송용 JSON 본문으로 직렬화합니다.
    ///
    /// 결과 `Bytes`는 재시도마다 복제 비용 없이 그대로 재사용됩니다.
    pub fn to_body(&self) -> Result<Bytes, ForwarderError> {
        serde_json::to_vec(&self.entries)
            .map(Bytes::from)
            .map_err(ForwarderError::Serialize)
    }
}
