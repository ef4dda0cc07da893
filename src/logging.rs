use std::time::Instant;

/// Print a message prefixed with elapsed time since `start`.
pub fn log_with_elapsed(start: Instant, message: &str) {
    let elapsed = start.elapsed().as_secs_f32();
    println!("[{elapsed:>8.2}s] {message}");
}

/// True when `POSTCODES_QUIET` is set to `1` or `true`.
pub fn logging_disabled() -> bool {
    std::env::var("POSTCODES_QUIET")
        .map(|value| quiet_value(&value))
        .unwrap_or(false)
}

/// Runtime event on stderr, unless silenced with `POSTCODES_QUIET`.
pub fn log_event(message: &str) {
    if !logging_disabled() {
        eprintln!("[postcodes] {message}");
    }
}

fn quiet_value(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::quiet_value;

    #[test]
    fn quiet_values() {
        assert!(quiet_value("1"));
        assert!(quiet_value("true"));
        assert!(quiet_value(" TRUE "));
        assert!(!quiet_value("0"));
        assert!(!quiet_value("false"));
        assert!(!quiet_value(""));
    }
}
