//! Time helpers

/// Current time as epoch milliseconds.
///
/// All persisted timestamps (problem reports, cleaning attribution) use
/// this representation.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_millis_is_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
        // Sanity: after 2020, before 2100
        assert!(a > 1_577_836_800_000);
        assert!(a < 4_102_444_800_000);
    }
}
