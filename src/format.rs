use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const SIZE_UNITS: [&str; 6] = ["B", "K", "M", "G", "T", "P"];

pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// Human-scaled byte size using binary prefixes, e.g. `1.00K` for 1024 bytes.
pub fn format_size(bytes: u64) -> String {
    format_size_f64(bytes as f64)
}

pub fn format_size_f64(bytes: f64) -> String {
    let mut value = bytes.max(0.0);
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2}{}", SIZE_UNITS[unit])
}

pub fn format_duration_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours}h {minutes}m {seconds}s")
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}
