//! 버전 문자열 비교 유틸리티
//!
//! 릴리스 태그(`v1.2.3`, `2.0.0-rc.1`, `1.0.0.dev3+build5` 등)를
//! `(숫자 세그먼트, 프리릴리스 랭크, 프리릴리스 번호)` 키로 정규화하여 비교합니다.
//!
//! ## 순서 규칙
//! - 숫자 세그먼트는 짧은 쪽을 0으로 채운 뒤 사전식 비교 (`1.2` == `1.2.0`)
//! - 세그먼트가 같으면 `dev` < `rc` < 정식 릴리스
//! - 랭크도 같으면 프리릴리스 번호 비교
//!
//! 파싱할 수 없는 문자열은 에러 대신 "세그먼트 없음" 센티널이 됩니다.
//! 센티널은 어떤 실제 버전보다도 낮게 정렬되므로, 최신 버전을 알 수 없으면
//! 업데이트를 알리지 않고 현재 버전을 알 수 없으면 항상 업데이트를 알립니다.

use std::cmp::Ordering;
use std::fmt;

/// 프리릴리스 랭크 (`dev` < `rc` < 정식)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseRank {
    Dev = 0,
    Rc = 1,
    Final = 2,
}

impl PreReleaseRank {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "dev" => PreReleaseRank::Dev,
            "rc" => PreReleaseRank::Rc,
            _ => PreReleaseRank::Final,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreReleaseRank::Dev => "dev",
            PreReleaseRank::Rc => "rc",
            PreReleaseRank::Final => "final",
        }
    }
}

/// 정상 파싱이 되지 않은 이유 (센티널로 대체됨)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseWarning {
    /// 공백이거나 `v` 접두사만 있는 문자열
    Blank,
    /// 선두 숫자 세그먼트를 하나도 찾지 못함
    NoNumericSegments,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::Blank => write!(f, "blank version string"),
            ParseWarning::NoNumericSegments => write!(f, "no numeric segments"),
        }
    }
}

/// 정규화된 버전 키
///
/// `PartialEq`/`Ord`는 0 패딩 규칙을 따르므로 `1.2`와 `1.2.0`은 같은 값입니다.
#[derive(Debug, Clone)]
pub struct ParsedVersion {
    pub numeric_segments: Vec<u64>,
    pub pre_release_rank: PreReleaseRank,
    pub pre_release_number: u64,
}

impl ParsedVersion {
    /// 파싱 불가 입력에 대한 센티널 (세그먼트 없음, 정식 랭크)
    pub fn sentinel() -> Self {
        Self {
            numeric_segments: Vec::new(),
            pre_release_rank: PreReleaseRank::Final,
            pre_release_number: 0,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.numeric_segments.is_empty()
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre_release_rank != PreReleaseRank::Final
    }

    /// 어떤 입력이든 값을 돌려줍니다. 실패 시 센티널.
    pub fn parse(raw: &str) -> Self {
        Self::parse_checked(raw).unwrap_or_else(|_| Self::sentinel())
    }

    /// 파싱 실패 이유를 확인할 수 있는 버전. 순서 결과는 `parse`와 동일합니다.
    pub fn parse_checked(raw: &str) -> Result<Self, ParseWarning> {
        let trimmed = raw.trim();
        let unprefixed = trimmed
            .strip_prefix(['v', 'V'])
            .unwrap_or(trimmed);
        let normalized = unprefixed.to_lowercase();
        if normalized.is_empty() {
            return Err(ParseWarning::Blank);
        }

        // 빌드 메타데이터는 순서에 영향 없음
        let s = normalized.split('+').next().unwrap_or_default();

        let marker = find_pre_release_marker(s);
        let numeric_segments = leading_numeric_segments(s);
        if numeric_segments.is_empty() {
            return Err(ParseWarning::NoNumericSegments);
        }

        let (pre_release_rank, pre_release_number) = match marker {
            Some((tag, number)) => (PreReleaseRank::from_tag(tag), number),
            None => (PreReleaseRank::Final, 0),
        };

        Ok(Self {
            numeric_segments,
            pre_release_rank,
            pre_release_number,
        })
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let n = self.numeric_segments.len().max(other.numeric_segments.len());
        for i in 0..n {
            let a = self.numeric_segments.get(i).copied().unwrap_or(0);
            let b = other.numeric_segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        match self.pre_release_rank.cmp(&other.pre_release_rank) {
            Ordering::Equal => {}
            ord => return ord,
        }
        self.pre_release_number.cmp(&other.pre_release_number)
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ParsedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParsedVersion {}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            return write!(f, "<unknown>");
        }
        let joined: Vec<String> = self.numeric_segments.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", joined.join("."))?;
        if self.is_prerelease() {
            write!(f, "-{}.{}", self.pre_release_rank.as_str(), self.pre_release_number)?;
        }
        Ok(())
    }
}

/// `latest`가 `current`보다 엄격하게 새로운지 여부
pub fn is_newer(latest: &str, current: &str) -> bool {
    ParsedVersion::parse(latest) > ParsedVersion::parse(current)
}

/// 두 버전 문자열의 순서
pub fn compare(a: &str, b: &str) -> Ordering {
    ParsedVersion::parse(a).cmp(&ParsedVersion::parse(b))
}

// ══════════════════════════════════════════════════════
// 토크나이저
// ══════════════════════════════════════════════════════

const SEPARATORS: [char; 3] = ['.', '-', '_'];
const PRE_RELEASE_TAGS: [&str; 2] = ["dev", "rc"];

/// 단어 문자/공백/숫자 판정은 모두 ASCII 기준 (비 ASCII 바이트는 비단어 문자)
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn skip_while(bytes: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> usize {
    let mut i = from;
    while i < bytes.len() && pred(bytes[i]) {
        i += 1;
    }
    i
}

/// 위치 `at`이 단어 경계인지 (앞뒤 중 한쪽만 단어 문자)
fn is_boundary(bytes: &[u8], at: usize) -> bool {
    let before = at > 0 && is_word_byte(bytes[at - 1]);
    let after = bytes.get(at).is_some_and(|b| is_word_byte(*b));
    before != after
}

fn parse_digits(digits: &[u8]) -> u64 {
    digits.iter().fold(0u64, |acc, d| {
        acc.saturating_mul(10).saturating_add(u64::from(d - b'0'))
    })
}

/// 태그 뒤 `[공백][.][공백][숫자]` 꼬리를 가장 긴 것부터 시도하여
/// 단어 경계로 끝나는 첫 조합의 숫자를 돌려줍니다.
fn match_marker_tail(bytes: &[u8], after_tag: usize) -> Option<u64> {
    let ws1_max = skip_while(bytes, after_tag, |b| b.is_ascii_whitespace());
    for ws1 in (after_tag..=ws1_max).rev() {
        let dot_options: &[bool] = if bytes.get(ws1) == Some(&b'.') {
            &[true, false]
        } else {
            &[false]
        };
        for &dot in dot_options {
            let after_dot = ws1 + usize::from(dot);
            let ws2_max = skip_while(bytes, after_dot, |b| b.is_ascii_whitespace());
            for ws2 in (after_dot..=ws2_max).rev() {
                let digits_max = skip_while(bytes, ws2, |b| b.is_ascii_digit());
                for end in (ws2..=digits_max).rev() {
                    if is_boundary(bytes, end) {
                        return Some(parse_digits(&bytes[ws2..end]));
                    }
                }
            }
        }
    }
    None
}

/// 문자열 어디서든 처음 나타나는 유효한 `dev`/`rc` 마커를 찾습니다.
fn find_pre_release_marker(s: &str) -> Option<(&'static str, u64)> {
    let bytes = s.as_bytes();
    for start in 0..bytes.len() {
        for tag in PRE_RELEASE_TAGS {
            if bytes[start..].starts_with(tag.as_bytes()) {
                if let Some(number) = match_marker_tail(bytes, start + tag.len()) {
                    return Some((tag, number));
                }
            }
        }
    }
    None
}

/// 구분자로 나눈 토큰의 선두 숫자를 모읍니다. 숫자로 시작하지 않는 첫 토큰에서 멈춥니다.
fn leading_numeric_segments(s: &str) -> Vec<u64> {
    let mut segments = Vec::new();
    for token in s.split(SEPARATORS) {
        if token.is_empty() {
            continue;
        }
        let bytes = token.as_bytes();
        let digits_end = skip_while(bytes, 0, |b| b.is_ascii_digit());
        if digits_end == 0 {
            break;
        }
        segments.push(parse_digits(&bytes[..digits_end]));
    }
    segments
}
