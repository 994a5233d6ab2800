use serde::{Deserialize, Serialize};

/// Threshold for 0-100 check-in scores.
pub const ASSESSMENT_THRESHOLD: f64 = 5.0;
/// Threshold for 0-10 session wellness scores.
pub const SESSION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }
}

/// Compare the newer half of `newest_first` against the older half.
///
/// With an odd count the extra point lands in the older half.
pub fn halves_trend(newest_first: &[f64], threshold: f64) -> Trend {
    if newest_first.len() < 2 {
        return Trend::Stable;
    }

    let (recent, older) = newest_first.split_at(newest_first.len() / 2);
    let avg = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;
    let diff = avg(recent) - avg(older);

    if diff > threshold {
        Trend::Improving
    } else if diff < -threshold {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_difference_is_stable() {
        assert_eq!(halves_trend(&[70.0, 72.0], ASSESSMENT_THRESHOLD), Trend::Stable);
    }

    #[test]
    fn newer_higher_is_improving() {
        assert_eq!(halves_trend(&[80.0, 60.0], ASSESSMENT_THRESHOLD), Trend::Improving);
        assert_eq!(halves_trend(&[60.0, 80.0], ASSESSMENT_THRESHOLD), Trend::Declining);
    }

    #[test]
    fn too_few_points_is_stable() {
        assert_eq!(halves_trend(&[], SESSION_THRESHOLD), Trend::Stable);
        assert_eq!(halves_trend(&[9.0], SESSION_THRESHOLD), Trend::Stable);
    }

    #[test]
    fn odd_lengths_put_extra_point_in_older_half() {
        // recent [8.0], older [6.0, 6.0]
        assert_eq!(halves_trend(&[8.0, 6.0, 6.0], SESSION_THRESHOLD), Trend::Improving);
        // recent [6.0], older [6.2, 6.2]
        assert_eq!(halves_trend(&[6.0, 6.2, 6.2], SESSION_THRESHOLD), Trend::Stable);
    }
}
