#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use screenwell_lib::db::models::NewUser;
use screenwell_lib::oracle::Oracle;
use screenwell_lib::personality;
use screenwell_lib::settings::{IngestSettings, SettingsStore};
use screenwell_lib::{App, SETTINGS_FILE};

pub const LECTURE_REPORT: &str = r#"```json
{
  "app_detected": "Coursera",
  "content_type": "educational",
  "extracted_text": "Week 3 | Linear regression | Next lecture",
  "detected_language": "en",
  "content_description": "A course video with lecture notes",
  "objects_detected": ["video player", "sidebar"],
  "engagement_indicators": {"is_video_playing": true},
  "content_tone": "positive",
  "potential_concerns": []
}
```"#;

/// Oracle double with fixed replies. `None` makes that kind of call fail.
pub struct ScriptedOracle {
    pub vision: Option<&'static str>,
    pub text: Option<&'static str>,
    pub vision_calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn lecture() -> Self {
        Self {
            vision: Some(LECTURE_REPORT),
            text: Some(r#"{"sentiment": "positive", "score": 0.6}"#),
            vision_calls: AtomicUsize::new(0),
        }
    }

    pub fn vision_calls(&self) -> usize {
        self.vision_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn describe_image(&self, _image: &[u8], _mime: &str, _prompt: &str, _max_tokens: u32) -> Result<String> {
        self.vision_calls.fetch_add(1, Ordering::SeqCst);
        match self.vision {
            Some(reply) => Ok(reply.to_string()),
            None => bail!("vision unavailable"),
        }
    }

    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        match self.text {
            Some(reply) => Ok(reply.to_string()),
            None => bail!("text unavailable"),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Frames are not written to disk and every frame reaches the oracle.
pub fn write_test_settings(dir: &Path) {
    let store = SettingsStore::new(dir.join(SETTINGS_FILE)).unwrap();
    store
        .update_ingest(IngestSettings {
            keep_frames: false,
            duplicate_hash_distance: 0,
            ..Default::default()
        })
        .unwrap();
}

pub async fn open_app(dir: &Path, oracle: Arc<dyn Oracle>) -> App {
    write_test_settings(dir);
    App::open_with_oracle(dir, oracle).await.unwrap()
}

pub fn png_frame(seed: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(48, 32, |x, y| {
        Rgb([
            seed.wrapping_mul(37).wrapping_add(x as u8 * 5),
            (y as u8).wrapping_mul(7),
            seed,
        ])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: "Riley".to_string(),
        age: Some(27),
        occupation: Some("Student".to_string()),
        ..Default::default()
    }
}

/// Every quiz question answered with `value`.
pub fn uniform_answers(value: i64) -> Vec<(String, i64)> {
    personality::all_questions()
        .into_iter()
        .map(|q| (q.id.to_string(), value))
        .collect()
}
