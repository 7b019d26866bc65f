//! Parsing and formatting helpers for the command-line surface.

use chrono::{Datelike, Days, Duration, NaiveDate};

/// Parse human-readable date input.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday" .. "sunday" (this week's occurrence, today included), "next friday"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" format
pub fn parse_date_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return today.checked_add_signed(Duration::try_days(days)?);
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return today.checked_add_signed(Duration::try_weeks(weeks)?);
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
    ];
    let current = u64::from(today.weekday().num_days_from_monday());
    for (name, target) in weekdays {
        let ahead = (target + 7 - current) % 7;
        if s == name {
            return today.checked_add_days(Days::new(ahead));
        }
        if s == format!("next {name}") {
            let ahead = if ahead == 0 { 7 } else { ahead + 7 };
            return today.checked_add_days(Days::new(ahead));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (d - today).num_days();
            if delta == 0 {
                "today".into()
            } else if delta == 1 {
                "tomorrow".into()
            } else if delta > 1 {
                format!("in {delta}d")
            } else {
                format!("{}d late", -delta)
            }
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Text progress bar, e.g. `[######----] 60%`.
pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width + 50) / 100;
    format!("[{}{}] {}%", "#".repeat(filled), "-".repeat(width - filled), percent)
}
