use chrono::{FixedOffset, Local, Offset};

pub const TIMEZONE_LABEL_PREFIX: &str = "DETECTED TIME ZONE:";

/// Picks the name shown in the timezone label: an explicit override, then the `TZ` variable,
/// then the numeric UTC offset.
pub fn resolve_timezone_name(
    override_name: Option<&str>,
    tz_env: Option<&str>,
    offset: FixedOffset,
) -> String {
    let named = override_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            tz_env
                .map(|tz| tz.trim().trim_start_matches(':'))
                .filter(|tz| !tz.is_empty())
        });
    match named {
        Some(name) => name.to_owned(),
        None => format_offset(offset),
    }
}

/// Resolves against the process environment and the current local offset.
pub fn detect_timezone_name(override_name: Option<&str>) -> String {
    let tz_env = std::env::var("TZ").ok();
    let offset = Local::now().offset().fix();
    resolve_timezone_name(override_name, tz_env.as_deref(), offset)
}

pub fn format_offset(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.unsigned_abs();
    format!("UTC{sign}{:02}:{:02}", secs / 3600, (secs / 60) % 60)
}

pub fn timezone_label(name: &str) -> String {
    format!("{TIMEZONE_LABEL_PREFIX} {name}")
}
