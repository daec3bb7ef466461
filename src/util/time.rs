/// Get the current time in milliseconds since the UNIX epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_millis() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        * 1000.0
}

/// Get the current time in milliseconds since the UNIX epoch
#[cfg(target_arch = "wasm32")]
pub fn current_time_millis() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.timing().navigation_start() + perf.now())
        .unwrap_or(0.0)
}

/// Get a timestamp in milliseconds since the UNIX epoch
pub fn timestamp_millis() -> u64 {
    current_time_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(timestamp_millis() > 1_577_836_800_000);
    }
}
