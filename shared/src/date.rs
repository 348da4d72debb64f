//! 时间类型模块
//!
//! - `Timestamp`: 可序列化的毫秒时间戳，用于 id 生成和存储
//! - `Clock`: 可注入的时钟，生产环境使用 `SystemClock`，测试使用 `FixedClock`

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =========================================================
// Timestamp - 可传输的时间戳类型
// =========================================================

/// 毫秒时间戳
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .unwrap_or_default()
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.as_millis() as i64)
    }
}

// =========================================================
// 日期格式
// =========================================================

/// `Jan 12, 2024` 形式的日期，用于加入日期和申请日期
pub fn display_date(ts: Timestamp) -> String {
    ts.to_datetime().format("%b %d, %Y").to_string()
}

// =========================================================
// Clock
// =========================================================

pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from(Utc::now())
    }
}

/// 测试用时钟：固定时间，可手动推进
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone, Default)]
pub struct FixedClock(std::rc::Rc<std::cell::Cell<i64>>);

#[cfg(any(test, feature = "mock"))]
impl FixedClock {
    pub fn at(ms: i64) -> Self {
        Self(std::rc::Rc::new(std::cell::Cell::new(ms)))
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by.as_millis() as i64);
    }
}

#[cfg(any(test, feature = "mock"))]
impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.0.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_date_matches_short_month_format() {
        // 2024-01-12T08:00:00Z
        let ts = Timestamp::new(1_705_046_400_000);
        assert_eq!(display_date(ts), "Jan 12, 2024");
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::at(1_000);
        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now().as_millis(), 3_000);
        assert_eq!(clock.now().as_secs(), 3);
    }
}
