// src/common/format.rs

// Rótulos curtos de tempo, no formato exibido pelos cards ("1h 5m", "2m 30s").

pub fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if rest > 0 || parts.is_empty() {
        parts.push(format!("{rest}m"));
    }
    parts.join(" ")
}

pub fn format_duration(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let rest = seconds % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if rest > 0 || parts.is_empty() {
        parts.push(format!("{rest}s"));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(40), "40m");
        assert_eq!(format_minutes(60), "1h");
        assert_eq!(format_minutes(65), "1h 5m");
    }

    #[test]
    fn seconds() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(3600), "1h");
        assert_eq!(format_duration(3723), "1h 2m 3s");
        assert_eq!(format_duration(150), "2m 30s");
    }
}
