//! Per-frame wellness impact decision.

use crate::catalog::{self, ImpactTier};
use crate::db::models::{ContentCategory, EngagementFlags, Sentiment, WellnessImpact};

/// Indicators needed before a set decides the outcome.
const DECIDING_COUNT: usize = 2;

/// Everything the decision looks at for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameSignals<'a> {
    pub category: ContentCategory,
    pub sentiment: Sentiment,
    pub app: &'a str,
    pub engagement: &'a EngagementFlags,
    pub concerns: &'a [String],
}

/// How many indicators of each set fired. Exposed for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorCounts {
    pub high_risk: usize,
    pub positive: usize,
    pub negative: usize,
}

pub fn count_indicators(signals: &FrameSignals<'_>, baseline: Option<ImpactTier>) -> IndicatorCounts {
    let concerns_text = signals.concerns.join(" ").to_lowercase();
    let concern_count = signals.concerns.len();
    let negative = signals.sentiment == Sentiment::Negative;
    let feed = signals.engagement.is_scrollable_feed;

    let high_risk = [
        baseline == Some(ImpactTier::HighRisk),
        negative && feed,
        concern_count >= 3,
        concerns_text.contains("addiction"),
        concerns_text.contains("fomo"),
    ];

    let positive = [
        matches!(
            signals.category,
            ContentCategory::Educational
                | ContentCategory::Work
                | ContentCategory::Health
                | ContentCategory::Professional
        ),
        baseline == Some(ImpactTier::Positive),
        signals.sentiment == Sentiment::Positive && signals.category != ContentCategory::SocialMedia,
    ];

    let negative_set = [
        negative,
        baseline == Some(ImpactTier::ModerateRisk) && feed,
        matches!(
            signals.category,
            ContentCategory::Gaming | ContentCategory::Entertainment
        ) && signals.engagement.is_video_playing,
        concern_count >= 2,
    ];

    IndicatorCounts {
        high_risk: high_risk.iter().filter(|fired| **fired).count(),
        positive: positive.iter().filter(|fired| **fired).count(),
        negative: negative_set.iter().filter(|fired| **fired).count(),
    }
}

/// Decide the wellness impact of one frame.
///
/// Indicator sets are checked in priority order: high risk, positive,
/// negative. When none reaches two hits the app's baseline tier decides.
pub fn wellness_impact(signals: &FrameSignals<'_>) -> WellnessImpact {
    let baseline = catalog::baseline_for(signals.app);
    let counts = count_indicators(signals, baseline);

    if counts.high_risk >= DECIDING_COUNT {
        WellnessImpact::Negative
    } else if counts.positive >= DECIDING_COUNT {
        WellnessImpact::Positive
    } else if counts.negative >= DECIDING_COUNT {
        WellnessImpact::Negative
    } else if baseline == Some(ImpactTier::ModerateRisk) {
        WellnessImpact::Neutral
    } else if baseline == Some(ImpactTier::Positive) {
        WellnessImpact::Positive
    } else {
        WellnessImpact::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals<'a>(
        category: ContentCategory,
        sentiment: Sentiment,
        app: &'a str,
        engagement: &'a EngagementFlags,
        concerns: &'a [String],
    ) -> FrameSignals<'a> {
        FrameSignals {
            category,
            sentiment,
            app,
            engagement,
            concerns,
        }
    }

    #[test]
    fn high_risk_baseline_alone_is_not_enough() {
        let flags = EngagementFlags::default();
        let s = signals(ContentCategory::SocialMedia, Sentiment::Neutral, "TikTok", &flags, &[]);
        assert_eq!(wellness_impact(&s), WellnessImpact::Neutral);
    }

    #[test]
    fn high_risk_baseline_with_negative_feed_is_negative() {
        let flags = EngagementFlags {
            is_scrollable_feed: true,
            ..Default::default()
        };
        let s = signals(ContentCategory::SocialMedia, Sentiment::Negative, "TikTok", &flags, &[]);
        assert_eq!(
            count_indicators(&s, catalog::baseline_for("TikTok")).high_risk,
            2
        );
        assert_eq!(wellness_impact(&s), WellnessImpact::Negative);
    }

    #[test]
    fn addiction_and_fomo_count_separately() {
        let flags = EngagementFlags::default();
        let concerns = vec!["Addiction loop".to_string()];
        let s = signals(ContentCategory::Other, Sentiment::Neutral, "", &flags, &concerns);
        assert_eq!(wellness_impact(&s), WellnessImpact::Neutral);

        let concerns = vec!["addiction".to_string(), "FOMO".to_string()];
        let s = signals(ContentCategory::Other, Sentiment::Neutral, "", &flags, &concerns);
        assert_eq!(wellness_impact(&s), WellnessImpact::Negative);
    }

    #[test]
    fn productive_category_with_positive_app() {
        let flags = EngagementFlags::default();
        let s = signals(ContentCategory::Educational, Sentiment::Neutral, "Coursera", &flags, &[]);
        assert_eq!(wellness_impact(&s), WellnessImpact::Positive);
    }

    #[test]
    fn positive_social_media_does_not_count_as_positive_sentiment() {
        let flags = EngagementFlags::default();
        let s = signals(ContentCategory::SocialMedia, Sentiment::Positive, "", &flags, &[]);
        assert_eq!(count_indicators(&s, None).positive, 0);
    }

    #[test]
    fn moderate_risk_feed_with_negative_sentiment() {
        let flags = EngagementFlags {
            is_scrollable_feed: true,
            ..Default::default()
        };
        // Instagram is moderate risk: feed + negative sentiment hits two
        // negative indicators, and only one high-risk indicator.
        let s = signals(ContentCategory::SocialMedia, Sentiment::Negative, "Instagram", &flags, &[]);
        assert_eq!(wellness_impact(&s), WellnessImpact::Negative);
    }

    #[test]
    fn moderate_risk_baseline_falls_back_to_neutral() {
        let flags = EngagementFlags::default();
        let s = signals(ContentCategory::SocialMedia, Sentiment::Neutral, "Instagram", &flags, &[]);
        assert_eq!(wellness_impact(&s), WellnessImpact::Neutral);
    }

    #[test]
    fn gaming_video_with_concerns_is_negative() {
        let flags = EngagementFlags {
            is_video_playing: true,
            ..Default::default()
        };
        let concerns = vec!["violence".to_string(), "loot boxes".to_string()];
        let s = signals(ContentCategory::Gaming, Sentiment::Neutral, "Some Game", &flags, &concerns);
        assert_eq!(wellness_impact(&s), WellnessImpact::Negative);
    }

    #[test]
    fn positive_baseline_alone_is_positive() {
        let flags = EngagementFlags::default();
        let s = signals(ContentCategory::Music, Sentiment::Neutral, "Spotify", &flags, &[]);
        assert_eq!(wellness_impact(&s), WellnessImpact::Positive);
    }
}
