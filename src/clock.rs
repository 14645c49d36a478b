//! 時刻ユーティリティ

use chrono::{Local, TimeZone, Utc};

/// 現在時刻（エポックミリ秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// エポックミリ秒をローカル時刻で表示
pub fn format_timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y/%m/%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}
