//! One frame through the oracle stages: vision, catalog re-rank,
//! translation, audio, sentiment, and finally the wellness decision.
//!
//! Oracle trouble never fails a frame. Each stage runs under its own timeout
//! with a fixed fallback, and the vision stage reports which branch it took
//! through [`VisionOutcome`].

use std::{
    collections::HashMap,
    future::Future,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Deserializer, Serialize};

use super::phash::{compute_hamming_distance, compute_phash};
use super::FrameUpload;
use crate::catalog;
use crate::classifier::{self, FrameSignals};
use crate::db::models::{
    AnalysisSource, ContentCategory, EngagementFlags, FrameRecord, Sentiment,
};
use crate::oracle::{parse_json_reply, Oracle};
use crate::settings::IngestSettings;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const VISION_MAX_TOKENS: u32 = 1000;
const TRANSLATION_MAX_TOKENS: u32 = 200;
const AUDIO_MAX_TOKENS: u32 = 300;
const SENTIMENT_MAX_TOKENS: u32 = 100;
const PROMPT_APP_COUNT: usize = 50;
const MIN_TRANSLATABLE_CHARS: usize = 3;
const UNKNOWN_APP: &str = "Unknown";

/// Accept `null` wherever a default would do.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// What the vision oracle says about a frame. Missing keys take defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisionReport {
    #[serde(deserialize_with = "nullable")]
    pub app_detected: String,
    #[serde(deserialize_with = "nullable")]
    pub content_type: String,
    #[serde(deserialize_with = "nullable")]
    pub extracted_text: String,
    #[serde(deserialize_with = "nullable")]
    pub detected_language: String,
    #[serde(deserialize_with = "nullable")]
    pub content_description: String,
    #[serde(deserialize_with = "nullable")]
    pub objects_detected: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub engagement_indicators: EngagementFlags,
    #[serde(deserialize_with = "nullable")]
    pub content_tone: String,
    #[serde(deserialize_with = "nullable")]
    pub potential_concerns: Vec<String>,
}

impl VisionReport {
    pub fn fallback() -> Self {
        Self {
            app_detected: UNKNOWN_APP.into(),
            content_type: ContentCategory::Other.as_str().into(),
            detected_language: "en".into(),
            content_description: "Unable to analyze".into(),
            content_tone: Sentiment::Neutral.as_str().into(),
            ..Default::default()
        }
    }

    /// Let the keyword catalog override the app and category when it finds
    /// a confident match.
    fn rerank(&mut self) {
        let matched = catalog::classify(
            &self.app_detected,
            &self.extracted_text,
            &self.content_description,
        );
        if let Some(category) = matched.category {
            self.app_detected = matched.app;
            self.content_type = category.as_str().to_string();
        }
    }
}

/// Result of the vision stage.
#[derive(Debug, Clone, PartialEq)]
pub enum VisionOutcome {
    Oracle(VisionReport),
    /// Near-duplicate of the session's previous analysed frame.
    Reused(VisionReport),
    Fallback { reason: String },
}

impl VisionOutcome {
    pub fn source(&self) -> AnalysisSource {
        match self {
            VisionOutcome::Oracle(_) => AnalysisSource::Oracle,
            VisionOutcome::Reused(_) => AnalysisSource::Reused,
            VisionOutcome::Fallback { .. } => AnalysisSource::Fallback,
        }
    }

    pub fn into_report(self) -> VisionReport {
        match self {
            VisionOutcome::Oracle(report) | VisionOutcome::Reused(report) => report,
            VisionOutcome::Fallback { .. } => VisionReport::fallback(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct AudioReport {
    #[serde(deserialize_with = "nullable")]
    detected_language: String,
    #[serde(deserialize_with = "nullable")]
    translated_text: String,
    #[serde(deserialize_with = "nullable")]
    category: String,
}

impl Default for AudioReport {
    fn default() -> Self {
        Self {
            detected_language: "en".into(),
            translated_text: String::new(),
            category: "other".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SentimentReply {
    #[serde(deserialize_with = "nullable")]
    sentiment: String,
    #[serde(deserialize_with = "nullable")]
    score: f64,
}

/// Local work done before any oracle call.
#[derive(Debug, Clone)]
pub struct PreparedFrame {
    pub phash: String,
    pub mime: &'static str,
    pub frame_path: Option<String>,
}

struct CachedVision {
    phash: String,
    report: VisionReport,
}

pub struct FrameAnalyzer {
    oracle: Arc<dyn Oracle>,
    settings: IngestSettings,
    frames_dir: PathBuf,
    vision_prompt: String,
    last_analyzed: Mutex<HashMap<i64, CachedVision>>,
}

fn decode(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat)> {
    let format = image::guess_format(bytes).context("unrecognized image format")?;
    let img = image::load_from_memory_with_format(bytes, format).context("failed to decode frame")?;
    Ok((img, format))
}

fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "hi" => "Hindi",
        other => other,
    }
}

fn vision_prompt() -> String {
    format!(
        r#"You are an expert screen content analyzer. Analyze this screen recording frame with extreme precision.

Extract ALL visible text: app and website names, titles, headers, menus, buttons, tabs, posts, comments, messages, usernames, timestamps, captions, URLs and notifications.

Identify the specific app or website from this list or similar: {apps}
Look for logos, UI patterns, color schemes and layout.

Categorize the content into one of: {categories}
Consider the actual content being viewed, not just the platform.

Return ONLY valid JSON with these exact keys:
{{
    "app_detected": "Specific app/website name",
    "content_type": "category from the list above",
    "extracted_text": "ALL visible text, separated by | for different sections",
    "detected_language": "primary language code (en, hi, es, fr, de, zh, ja, ko, ar, pt, ru, etc.)",
    "content_description": "Detailed description of what's shown on screen",
    "objects_detected": ["list", "of", "UI elements", "and", "objects"],
    "engagement_indicators": {{
        "has_notifications": true/false,
        "has_comments": true/false,
        "has_likes": true/false,
        "is_video_playing": true/false,
        "is_scrollable_feed": true/false
    }},
    "content_tone": "positive/negative/neutral/mixed",
    "potential_concerns": ["list any concerning content like clickbait, FOMO, etc."]
}}"#,
        apps = catalog::prompt_app_names(PROMPT_APP_COUNT),
        categories = catalog::prompt_category_names(),
    )
}

impl FrameAnalyzer {
    pub fn new(oracle: Arc<dyn Oracle>, settings: IngestSettings, frames_dir: PathBuf) -> Self {
        Self {
            oracle,
            settings,
            frames_dir,
            vision_prompt: vision_prompt(),
            last_analyzed: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Full pipeline for one upload. Fails only when the image itself is
    /// unusable.
    pub async fn analyze(&self, upload: &FrameUpload) -> Result<FrameRecord> {
        let prepared = self.prepare(upload).await?;
        Ok(self.analyze_prepared(upload, &prepared).await)
    }

    /// Decode, hash and optionally store the frame.
    pub async fn prepare(&self, upload: &FrameUpload) -> Result<PreparedFrame> {
        let bytes = Arc::clone(&upload.image);
        let (phash, format) = tokio::task::spawn_blocking(move || -> Result<(String, ImageFormat)> {
            let (img, format) = decode(&bytes)?;
            Ok((compute_phash(&img), format))
        })
        .await
        .context("frame decode worker join failed")??;

        let frame_path = if self.settings.keep_frames {
            self.save_frame(upload, format).await
        } else {
            None
        };

        Ok(PreparedFrame {
            phash,
            mime: format.to_mime_type(),
            frame_path,
        })
    }

    async fn save_frame(&self, upload: &FrameUpload, format: ImageFormat) -> Option<String> {
        let extension = format.extensions_str().first().copied().unwrap_or("img");
        let dir = self.frames_dir.join(upload.session_id.to_string());
        let path = dir.join(format!("frame_{:04}.{}", upload.frame_number, extension));

        let result = async {
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("failed to create {}", dir.display()))?;
            tokio::fs::write(&path, &upload.image[..])
                .await
                .with_context(|| format!("failed to write {}", path.display()))
        }
        .await;

        match result {
            Ok(()) => Some(path.to_string_lossy().into_owned()),
            Err(err) => {
                log_warn!("frame {} of session {} not saved: {err:#}", upload.frame_number, upload.session_id);
                None
            }
        }
    }

    pub async fn analyze_prepared(&self, upload: &FrameUpload, prepared: &PreparedFrame) -> FrameRecord {
        let started = Instant::now();
        let vision = self.vision_stage(upload, prepared).await;
        if let VisionOutcome::Fallback { reason } = &vision {
            log_warn!(
                "vision fallback for frame {} of session {}: {reason}",
                upload.frame_number,
                upload.session_id
            );
        }
        let source = vision.source();
        let report = vision.into_report();

        let language = normalized_language(&report.detected_language);
        let translated_text = self.translate(&report.extracted_text, &language).await;

        let audio = match upload.audio_transcript.as_deref().map(str::trim) {
            Some(transcript) if !transcript.is_empty() => Some(self.audio_stage(transcript).await),
            _ => None,
        };

        let text_for_tone = translated_text.as_deref().unwrap_or(&report.extracted_text);
        let audio_text = audio.as_ref().map(|a| a.translated_text.as_str());
        let (sentiment, sentiment_score) = self
            .sentiment_stage(&report.content_description, text_for_tone, audio_text)
            .await;

        let record = self.build_record(upload, prepared, report, language, translated_text, sentiment, sentiment_score, source);
        log_info!(
            "frame {} of session {} analysed in {}ms: app={} category={} impact={} source={}",
            upload.frame_number,
            upload.session_id,
            started.elapsed().as_millis(),
            record.app_detected,
            record.content_type.as_str(),
            record.wellness_impact.as_str(),
            record.source.as_str()
        );
        record
    }

    /// One oracle call bounded by the stage timeout.
    async fn bounded<T>(&self, stage: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        let limit = self.settings.stage_timeout();
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| anyhow!("{stage} stage timed out after {}s", limit.as_secs()))?
    }

    /// Drop the duplicate-detection state kept for a session.
    pub fn forget_session(&self, session_id: i64) {
        self.last_analyzed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session_id);
    }

    fn reusable_report(&self, session_id: i64, phash: &str) -> Option<VisionReport> {
        let max_distance = self.settings.duplicate_hash_distance;
        if max_distance == 0 {
            return None;
        }
        let cache = self.last_analyzed.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(&session_id)
            .filter(|cached| compute_hamming_distance(&cached.phash, phash) <= max_distance)
            .map(|cached| cached.report.clone())
    }

    async fn vision_stage(&self, upload: &FrameUpload, prepared: &PreparedFrame) -> VisionOutcome {
        if let Some(report) = self.reusable_report(upload.session_id, &prepared.phash) {
            return VisionOutcome::Reused(report);
        }

        let reply = self
            .bounded(
                "vision",
                self.oracle
                    .describe_image(&upload.image, prepared.mime, &self.vision_prompt, VISION_MAX_TOKENS),
            )
            .await;
        match reply.and_then(|text| parse_json_reply::<VisionReport>(&text)) {
            Ok(mut report) => {
                report.rerank();
                self.last_analyzed
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(
                        upload.session_id,
                        CachedVision {
                            phash: prepared.phash.clone(),
                            report: report.clone(),
                        },
                    );
                VisionOutcome::Oracle(report)
            }
            Err(err) => VisionOutcome::Fallback {
                reason: format!("{err:#}"),
            },
        }
    }

    /// `None` when no translation is needed or it failed.
    async fn translate(&self, text: &str, language: &str) -> Option<String> {
        if text.trim().chars().count() < MIN_TRANSLATABLE_CHARS
            || language.eq_ignore_ascii_case(&self.settings.reference_language)
        {
            return None;
        }

        let prompt = format!(
            "Translate this text from {} to {}. Only return the translation, nothing else:\n\n{}",
            language,
            language_name(&self.settings.reference_language),
            text
        );
        match self
            .bounded("translation", self.oracle.complete(&prompt, TRANSLATION_MAX_TOKENS))
            .await
        {
            Ok(reply) if !reply.trim().is_empty() => Some(reply.trim().to_string()),
            Ok(_) => None,
            Err(err) => {
                log_warn!("translation failed, keeping original text: {err:#}");
                None
            }
        }
    }

    async fn audio_stage(&self, transcript: &str) -> AudioReport {
        let prompt = format!(
            "Analyze this audio transcription:\n\"{transcript}\"\n\n\
             Provide:\n\
             1. Detected language code\n\
             2. If not English, translate to English\n\
             3. Content category (conversation, educational, entertainment, news, other)\n\n\
             Return as JSON with keys: detected_language, translated_text, category"
        );
        let reply = self
            .bounded("audio", self.oracle.complete(&prompt, AUDIO_MAX_TOKENS))
            .await;
        let mut report = match reply.and_then(|text| parse_json_reply::<AudioReport>(&text)) {
            Ok(report) => report,
            Err(err) => {
                log_warn!("audio analysis fell back: {err:#}");
                AudioReport::default()
            }
        };
        if report.translated_text.trim().is_empty() {
            report.translated_text = transcript.to_string();
        }
        report
    }

    async fn sentiment_stage(
        &self,
        description: &str,
        text: &str,
        audio_text: Option<&str>,
    ) -> (Sentiment, f64) {
        let mut combined = format!("Visual: {description}. Text: {text}.");
        if let Some(audio) = audio_text {
            combined.push_str(&format!(" Audio: {audio}"));
        }
        let prompt = format!(
            "Analyze the sentiment and emotional impact of this content:\n{combined}\n\n\
             Classify as: positive, negative, neutral, or mixed\n\
             Also provide a sentiment score from -1.0 (very negative) to 1.0 (very positive)\n\n\
             Return as JSON with keys: sentiment, score"
        );

        let reply = self
            .bounded("sentiment", self.oracle.complete(&prompt, SENTIMENT_MAX_TOKENS))
            .await;
        match reply.and_then(|text| parse_json_reply::<SentimentReply>(&text)) {
            Ok(parsed) => (Sentiment::parse(&parsed.sentiment), clamp_score(parsed.score)),
            Err(err) => {
                log_warn!("sentiment analysis fell back: {err:#}");
                (Sentiment::Neutral, 0.0)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_record(
        &self,
        upload: &FrameUpload,
        prepared: &PreparedFrame,
        report: VisionReport,
        language: String,
        translated_text: Option<String>,
        sentiment: Sentiment,
        sentiment_score: f64,
        source: AnalysisSource,
    ) -> FrameRecord {
        let category = ContentCategory::parse(&report.content_type);
        let app = match report.app_detected.trim() {
            "" => UNKNOWN_APP.to_string(),
            name => name.to_string(),
        };
        let wellness_impact = classifier::wellness_impact(&FrameSignals {
            category,
            sentiment,
            app: &app,
            engagement: &report.engagement_indicators,
            concerns: &report.potential_concerns,
        });

        FrameRecord {
            id: None,
            session_id: upload.session_id,
            frame_number: upload.frame_number,
            timestamp: upload.timestamp,
            frame_path: prepared.frame_path.clone(),
            app_detected: app,
            content_type: category,
            extracted_text: report.extracted_text,
            detected_language: language,
            translated_text,
            content_description: report.content_description,
            objects_detected: report.objects_detected,
            engagement: report.engagement_indicators,
            concerns: report.potential_concerns,
            sentiment,
            sentiment_score,
            wellness_impact,
            source,
            phash: Some(prepared.phash.clone()),
            created_at: Utc::now(),
        }
    }
}

fn normalized_language(code: &str) -> String {
    match code.trim() {
        "" => "en".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::WellnessImpact;
    use anyhow::bail;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers vision calls with `vision`, text calls by prompt prefix.
    struct Scripted {
        vision: Option<&'static str>,
        sentiment: Option<&'static str>,
        translation: Option<&'static str>,
        stall_text: bool,
        vision_calls: AtomicUsize,
    }

    impl Scripted {
        fn new(vision: Option<&'static str>, sentiment: Option<&'static str>) -> Self {
            Self {
                vision,
                sentiment,
                translation: None,
                stall_text: false,
                vision_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Oracle for Scripted {
        async fn describe_image(&self, _: &[u8], mime: &str, _: &str, _: u32) -> Result<String> {
            assert_eq!(mime, "image/png");
            self.vision_calls.fetch_add(1, Ordering::SeqCst);
            match self.vision {
                Some(reply) => Ok(reply.to_string()),
                None => bail!("vision down"),
            }
        }

        async fn complete(&self, prompt: &str, _: u32) -> Result<String> {
            if self.stall_text {
                std::future::pending::<()>().await;
            }
            let reply = if prompt.starts_with("Translate") {
                self.translation
            } else if prompt.starts_with("Analyze the sentiment") {
                self.sentiment
            } else {
                None
            };
            match reply {
                Some(reply) => Ok(reply.to_string()),
                None => bail!("text down"),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn png(shade: u8) -> Arc<[u8]> {
        let img = RgbImage::from_fn(32, 32, |x, y| {
            Rgb([shade.wrapping_add((x * 7) as u8), (y * 5) as u8, shade])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        Arc::from(bytes)
    }

    fn upload(frame_number: u32, image: Arc<[u8]>) -> FrameUpload {
        FrameUpload {
            session_id: 1,
            frame_number,
            timestamp: f64::from(frame_number) * 0.5,
            image,
            audio_transcript: None,
        }
    }

    fn analyzer(oracle: Scripted, keep_frames: bool, dir: PathBuf) -> FrameAnalyzer {
        let settings = IngestSettings {
            keep_frames,
            ..Default::default()
        };
        FrameAnalyzer::new(Arc::new(oracle), settings, dir)
    }

    const TIKTOK_FEED: &str = r#"```json
{"app_detected": "TikTok", "content_type": "video", "extracted_text": "For You | Following",
 "detected_language": "en", "content_description": "short video feed",
 "engagement_indicators": {"is_scrollable_feed": true, "is_video_playing": true},
 "potential_concerns": ["FOMO", "addiction"]}
```"#;

    #[tokio::test]
    async fn oracle_report_is_reranked_and_classified() {
        let dir = tempfile::tempdir().unwrap();
        let oracle = Scripted::new(Some(TIKTOK_FEED), Some(r#"{"sentiment": "Negative", "score": -3}"#));
        let analyzer = analyzer(oracle, true, dir.path().to_path_buf());

        let record = analyzer.analyze(&upload(3, png(10))).await.unwrap();
        assert_eq!(record.source, AnalysisSource::Oracle);
        assert_eq!(record.app_detected, "Tiktok");
        assert_eq!(record.content_type, ContentCategory::SocialMedia);
        assert_eq!(record.sentiment, Sentiment::Negative);
        assert_eq!(record.sentiment_score, -1.0);
        assert_eq!(record.wellness_impact, WellnessImpact::Negative);
        assert_eq!(record.timestamp, 1.5);

        let path = record.frame_path.unwrap();
        assert!(path.ends_with("frame_0003.png"));
        assert!(std::path::Path::new(&path).exists());
    }

    #[tokio::test]
    async fn oracle_failure_takes_the_fallback_branch() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = analyzer(Scripted::new(None, None), false, dir.path().to_path_buf());

        let record = analyzer.analyze(&upload(0, png(10))).await.unwrap();
        assert_eq!(record.source, AnalysisSource::Fallback);
        assert_eq!(record.app_detected, "Unknown");
        assert_eq!(record.content_type, ContentCategory::Other);
        assert_eq!(record.sentiment, Sentiment::Neutral);
        assert_eq!(record.sentiment_score, 0.0);
        assert_eq!(record.wellness_impact, WellnessImpact::Neutral);
        assert!(record.frame_path.is_none());
    }

    #[tokio::test]
    async fn unparsable_vision_reply_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let oracle = Scripted::new(Some("I can't see anything."), None);
        let analyzer = analyzer(oracle, false, dir.path().to_path_buf());
        let prepared = analyzer.prepare(&upload(0, png(1))).await.unwrap();
        let outcome = analyzer.vision_stage(&upload(0, png(1)), &prepared).await;
        assert!(matches!(outcome, VisionOutcome::Fallback { .. }));
    }

    #[tokio::test]
    async fn near_duplicate_frames_reuse_the_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let oracle = Scripted::new(Some(TIKTOK_FEED), None);
        let analyzer = analyzer(oracle, false, dir.path().to_path_buf());

        let first = analyzer.analyze(&upload(0, png(10))).await.unwrap();
        let second = analyzer.analyze(&upload(1, png(10))).await.unwrap();
        assert_eq!(first.source, AnalysisSource::Oracle);
        assert_eq!(second.source, AnalysisSource::Reused);
        assert_eq!(second.app_detected, "Tiktok");

        analyzer.forget_session(1);
        let third = analyzer.analyze(&upload(2, png(10))).await.unwrap();
        assert_eq!(third.source, AnalysisSource::Oracle);
    }

    #[tokio::test]
    async fn foreign_text_is_translated() {
        let dir = tempfile::tempdir().unwrap();
        let mut oracle = Scripted::new(
            Some(r#"{"app_detected": "Notes", "extracted_text": "hola mundo", "detected_language": "ES"}"#),
            None,
        );
        oracle.translation = Some("  hello world ");
        let analyzer = analyzer(oracle, false, dir.path().to_path_buf());

        let record = analyzer.analyze(&upload(0, png(3))).await.unwrap();
        assert_eq!(record.detected_language, "es");
        assert_eq!(record.translated_text.as_deref(), Some("hello world"));
        assert_eq!(record.extracted_text, "hola mundo");
    }

    #[tokio::test]
    async fn stalled_sentiment_keeps_the_vision_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut oracle = Scripted::new(Some(TIKTOK_FEED), Some(r#"{"sentiment": "positive", "score": 1}"#));
        oracle.stall_text = true;
        let settings = IngestSettings {
            keep_frames: false,
            stage_timeout_secs: 1,
            ..Default::default()
        };
        let analyzer = FrameAnalyzer::new(Arc::new(oracle), settings, dir.path().to_path_buf());

        let record = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            analyzer.analyze(&upload(0, png(10))),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(record.source, AnalysisSource::Oracle);
        assert_eq!(record.app_detected, "Tiktok");
        assert_eq!(record.content_type, ContentCategory::SocialMedia);
        assert_eq!(record.sentiment, Sentiment::Neutral);
        assert_eq!(record.sentiment_score, 0.0);
    }

    #[tokio::test]
    async fn undecodable_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = analyzer(Scripted::new(None, None), false, dir.path().to_path_buf());
        let bad = upload(0, Arc::from(vec![1u8, 2, 3, 4]));
        assert!(analyzer.analyze(&bad).await.is_err());
    }

    #[test]
    fn vision_report_tolerates_nulls_and_missing_keys() {
        let report: VisionReport =
            serde_json::from_str(r#"{"app_detected": null, "objects_detected": null}"#).unwrap();
        assert_eq!(report.app_detected, "");
        assert!(report.objects_detected.is_empty());
        assert_eq!(report.engagement_indicators, EngagementFlags::default());
    }

    #[test]
    fn fallback_report_is_neutral() {
        let outcome = VisionOutcome::Fallback {
            reason: "timeout".into(),
        };
        assert_eq!(outcome.source(), AnalysisSource::Fallback);
        let report = outcome.into_report();
        assert_eq!(report.app_detected, "Unknown");
        assert_eq!(report.content_type, "other");
    }
}
