//! Frame ingestion: uploads are queued, analysed concurrently and stored
//! against their recording session.

pub mod analyzer;
pub mod controller;
pub mod phash;
mod worker;

use std::sync::Arc;

pub use analyzer::{FrameAnalyzer, VisionOutcome, VisionReport};
pub use controller::{FrameTicket, IngestController};

/// One uploaded screen frame.
#[derive(Debug, Clone)]
pub struct FrameUpload {
    pub session_id: i64,
    pub frame_number: u32,
    /// Seconds since the start of the recording.
    pub timestamp: f64,
    pub image: Arc<[u8]>,
    pub audio_transcript: Option<String>,
}

impl FrameUpload {
    /// Timestamp derived from the frame's position at the extraction rate.
    pub fn new(session_id: i64, frame_number: u32, frames_per_second: f64, image: Vec<u8>) -> Self {
        let timestamp = if frames_per_second > 0.0 {
            f64::from(frame_number) / frames_per_second
        } else {
            0.0
        };
        Self {
            session_id,
            frame_number,
            timestamp,
            image: Arc::from(image),
            audio_transcript: None,
        }
    }

    pub fn with_audio(mut self, transcript: impl Into<String>) -> Self {
        self.audio_transcript = Some(transcript.into());
        self
    }
}
