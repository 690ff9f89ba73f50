/// Format whole seconds as `MM:SS`; minutes keep growing past an hour.
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Filled and hollow stars, `earned` of `max`
pub fn star_row(earned: u8, max: u8) -> String {
    (0..max)
        .map(|i| if i < earned { '★' } else { '☆' })
        .collect()
}
