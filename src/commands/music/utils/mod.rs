// Export music utilities
pub mod embedded_messages;
pub mod event_handlers;
pub mod idle_supervisor;
pub mod music_manager;
pub mod notifier;
pub mod queue_manager;
pub mod voice_session;

/// Format a duration in seconds as "1h 2m 3s", "3m 7s" or "45s".
///
/// Sources report live streams with a zero duration.
pub fn format_duration(seconds: Option<u64>) -> String {
    let Some(total) = seconds else {
        return "Unknown".to_string();
    };
    if total == 0 {
        return "LIVE".to_string();
    }

    // Hours keep counting past a day; humantime would switch to days and
    // drop zero units ("1h" rather than "1h 0m 0s").
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Abbreviate a view or like count: 999, 12K, 3.4M, 1.2B.
pub fn format_count(count: Option<u64>) -> String {
    let Some(count) = count else {
        return "Unknown".to_string();
    };

    match count {
        0..1_000 => count.to_string(),
        1_000..1_000_000 => format!("{}K", count / 1_000),
        1_000_000..1_000_000_000 => with_tenths(count, 1_000_000, "M"),
        _ => with_tenths(count, 1_000_000_000, "B"),
    }
}

fn with_tenths(count: u64, unit: u64, suffix: &str) -> String {
    let whole = count / unit;
    let tenths = (count % unit) / (unit / 10);
    if tenths == 0 {
        format!("{}{}", whole, suffix)
    } else {
        format!("{}.{}{}", whole, tenths, suffix)
    }
}
