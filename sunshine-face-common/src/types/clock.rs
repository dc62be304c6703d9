//! 表盘时钟数据
//!
//! 每次渲染都从墙上时钟重新计算，不跨帧缓存。

use core::fmt::Write;

use heapless::String;
use jiff::Timestamp;
use jiff::tz::Offset;

use crate::types::{FaceResult, TimeError};

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarDate {
    pub year: i16,
    pub month: u8,
    pub day: u8,
    /// 0 = 周一
    pub weekday: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockState {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub date: CalendarDate,
}

impl ClockState {
    /// 由 Unix 毫秒时间戳和 UTC 偏移（秒）计算本地时间
    pub fn from_unix_millis(millis: i64, utc_offset_seconds: i32) -> FaceResult<Self> {
        let timestamp =
            Timestamp::from_millisecond(millis).map_err(|_| TimeError::InvalidTimestamp)?;
        let offset =
            Offset::from_seconds(utc_offset_seconds).map_err(|_| TimeError::InvalidOffset)?;
        let local = offset.to_datetime(timestamp);

        Ok(Self {
            hour: local.hour() as u8,
            minute: local.minute() as u8,
            second: local.second() as u8,
            date: CalendarDate {
                year: local.year(),
                month: local.month() as u8,
                day: local.day() as u8,
                weekday: local.weekday().to_monday_zero_offset() as u8,
            },
        })
    }

    /// 12 小时制的小时，范围 0..=11
    pub fn hour_12(&self) -> u8 {
        self.hour % 12
    }

    /// `h:mm`
    pub fn hour_minute_text(&self) -> String<8> {
        let mut text = String::new();
        let _ = write!(text, "{}:{:02}", self.hour_12(), self.minute);
        text
    }

    /// `:ss`，仅交互模式显示
    pub fn seconds_text(&self) -> String<4> {
        let mut text = String::new();
        let _ = write!(text, ":{:02}", self.second);
        text
    }

    /// `EEE, MMM dd yyyy`
    pub fn date_text(&self) -> String<24> {
        let mut text = String::new();
        let _ = write!(
            text,
            "{}, {} {:02} {}",
            get_weekday_name(self.date.weekday),
            get_month_name(self.date.month),
            self.date.day,
            self.date.year
        );
        text
    }
}

pub fn get_weekday_name(weekday: u8) -> &'static str {
    WEEKDAY_NAMES[weekday as usize % 7]
}

pub fn get_month_name(month: u8) -> &'static str {
    MONTH_NAMES[(month as usize + 11) % 12]
}
