pub mod logging;

/// Round to `places` decimal digits, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn rounds_to_requested_places() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(66.66666, 1), 66.7);
        assert_eq!(round_to(5.0, 2), 5.0);
    }
}
