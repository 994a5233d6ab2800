use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::aggregation::{
    self,
    analytics::{self, AppDetail, AppShare, ContentAnalysis, SentimentPoint, UserStats, WellnessPoint},
    insights,
    user::{DEFAULT_QUICK_INSIGHTS, RECENT_SESSIONS},
    Alert, QuickInsight, UserData,
};
use crate::assessment::{self, AssessmentHistory};
use crate::db::models::{
    AssessmentKind, NewUser, PeriodicAssessment, PersonalityProfile, ScreenSession, StoredGraph,
    User, WellnessHistoryEntry,
};
use crate::db::{Database, FrameInsert};
use crate::graph;
use crate::ingest::{FrameAnalyzer, FrameTicket, FrameUpload, IngestController};
use crate::oracle::{HttpOracle, OfflineOracle, Oracle};
use crate::personality::{self, ImprovementPlan, QuestionBank};
use crate::settings::{api_key_from_env, SettingsStore};

pub const DATABASE_FILE: &str = "screenwell.db";
pub const SETTINGS_FILE: &str = "settings.json";
pub const FRAMES_DIR: &str = "frames";

/// Everything the dashboard shows for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user: User,
    pub profile: Option<PersonalityProfile>,
    pub stats: UserStats,
    pub app_usage: Vec<AppShare>,
    pub content: ContentAnalysis,
    pub sentiment_timeline: Vec<SentimentPoint>,
    pub wellness_trend: Vec<WellnessPoint>,
    pub user_data: Option<UserData>,
    pub alerts: Vec<Alert>,
    pub quick_insights: Vec<QuickInsight>,
    pub recommendations: ImprovementPlan,
    pub wellness_history: Vec<WellnessHistoryEntry>,
}

/// The engine behind the CLI: storage, settings, oracle and the ingest
/// worker, opened over one data directory.
pub struct App {
    db: Database,
    settings: SettingsStore,
    oracle: Arc<dyn Oracle>,
    ingest: RwLock<IngestController>,
    data_dir: PathBuf,
}

impl App {
    /// Open with the oracle chosen from the environment: the HTTP oracle
    /// when an API key is set, otherwise the offline one.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;

        let oracle: Arc<dyn Oracle> = match api_key_from_env() {
            Some(key) => Arc::new(HttpOracle::new(settings.oracle(), key)?),
            None => {
                warn!("No API key configured; frames will be stored with fallback analysis");
                Arc::new(OfflineOracle)
            }
        };
        Self::open_with(data_dir, settings, oracle).await
    }

    pub async fn open_with_oracle(data_dir: impl AsRef<Path>, oracle: Arc<dyn Oracle>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;
        Self::open_with(data_dir, settings, oracle).await
    }

    async fn open_with(data_dir: &Path, settings: SettingsStore, oracle: Arc<dyn Oracle>) -> Result<Self> {
        let db = Database::new(data_dir.join(DATABASE_FILE))?;

        // Sessions left recording by an earlier run stay open for more frames.
        for session in db.recording_sessions().await? {
            info!(
                "Session {} of user {} is still recording since {}",
                session.id,
                session.user_id,
                session.created_at.to_rfc3339()
            );
        }

        let analyzer = Arc::new(FrameAnalyzer::new(
            Arc::clone(&oracle),
            settings.ingest(),
            data_dir.join(FRAMES_DIR),
        ));
        let mut ingest = IngestController::new();
        ingest.start(analyzer, db.clone())?;

        info!("Screenwell opened at {} (oracle: {})", data_dir.display(), oracle.name());
        Ok(Self {
            db,
            settings,
            oracle,
            ingest: RwLock::new(ingest),
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Stop the ingest worker. Frames already being analysed are stored
    /// first.
    pub async fn shutdown(&self) -> Result<()> {
        self.ingest.write().await.stop().await
    }

    // Users and quiz

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.db.create_user(new_user).await
    }

    pub async fn user(&self, user_id: i64) -> Result<User> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| anyhow!("user {user_id} not found"))
    }

    pub fn questions(&self) -> QuestionBank {
        personality::question_bank()
    }

    /// Score and store a quiz submission. Out-of-range answers are clamped
    /// and unknown question ids dropped.
    pub async fn submit_quiz<I, K>(&self, user_id: i64, raw_answers: I) -> Result<PersonalityProfile>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        self.user(user_id).await?;
        let answers = personality::sanitize_answers(raw_answers);
        let results = personality::analyze(&answers);
        let profile = self
            .db
            .save_quiz_submission(user_id, answers, results, Utc::now())
            .await?;
        info!(
            "User {} assessed as {} (stress {})",
            user_id,
            profile.results.personality_type,
            profile.results.stress_level.as_str()
        );
        self.refresh_graph(user_id).await;
        Ok(profile)
    }

    /// Clear the answers so the quiz can be taken again. The last profile and
    /// the wellness history stay.
    pub async fn retake_quiz(&self, user_id: i64) -> Result<()> {
        self.user(user_id).await?;
        self.db.reset_quiz(user_id).await
    }

    pub async fn profile(&self, user_id: i64) -> Result<Option<PersonalityProfile>> {
        self.db.get_profile(user_id).await
    }

    // Sessions and frames

    pub async fn start_session(&self, user_id: i64, name: Option<String>) -> Result<ScreenSession> {
        self.user(user_id).await?;
        self.db.create_session(user_id, name).await
    }

    pub async fn session(&self, session_id: i64) -> Result<ScreenSession> {
        self.db
            .get_session(session_id)
            .await?
            .ok_or_else(|| anyhow!("session {session_id} not found"))
    }

    /// Upload with a timestamp derived from the configured extraction rate.
    pub fn upload(&self, session_id: i64, frame_number: u32, image: Vec<u8>) -> FrameUpload {
        FrameUpload::new(
            session_id,
            frame_number,
            self.settings.ingest().frames_per_second,
            image,
        )
    }

    /// Queue a frame for analysis. Only recording sessions accept frames.
    pub async fn enqueue_frame(&self, upload: FrameUpload) -> Result<FrameTicket> {
        let session = self.session(upload.session_id).await?;
        if !session.is_recording() {
            bail!("session {} is not recording", session.id);
        }
        self.ingest.read().await.submit(upload).await
    }

    /// Analyse and store one frame, waiting for the outcome.
    pub async fn submit_frame(&self, upload: FrameUpload) -> Result<FrameInsert> {
        self.enqueue_frame(upload).await?.outcome().await
    }

    /// Wait for the session's queued frames, then fold them into the summary.
    pub async fn complete_session(&self, session_id: i64) -> Result<ScreenSession> {
        self.ingest.read().await.drain_session(session_id).await;
        let session = self.db.complete_session(session_id).await?;
        if let Some(summary) = &session.summary {
            info!(
                "Session {} completed: {} frames, wellness {:.2}, productivity {:.2}",
                session.id, summary.total_frames, summary.wellness_score, summary.productivity_score
            );
        }
        self.refresh_graph(session.user_id).await;
        Ok(session)
    }

    // Dashboards

    pub async fn dashboard(&self, user_id: i64) -> Result<Dashboard> {
        let user = self.user(user_id).await?;
        let profile = self.db.get_profile(user_id).await?;
        let sessions = self.db.completed_sessions(user_id).await?;
        let impacts = self.db.recent_frame_impacts(user_id, RECENT_SESSIONS).await?;
        let wellness_history = self.db.wellness_history(user_id).await?;

        let user_data = aggregation::gather_user_data(&sessions, &impacts);
        let traits = profile.as_ref().map(|p| p.results.traits);
        let stress = profile.as_ref().map(|p| p.results.stress_level);
        let avg_wellness = user_data.as_ref().map(|d| d.avg_wellness);

        Ok(Dashboard {
            stats: analytics::user_stats(&sessions),
            app_usage: analytics::app_usage(&sessions),
            content: analytics::content_analysis(&sessions),
            sentiment_timeline: analytics::sentiment_timeline(&sessions),
            wellness_trend: analytics::wellness_trend_series(&sessions),
            alerts: aggregation::wellness_alerts(user_data.as_ref()),
            quick_insights: aggregation::quick_insights(user_data.as_ref(), DEFAULT_QUICK_INSIGHTS),
            recommendations: personality::improvement_recommendations(traits.as_ref(), stress, avg_wellness),
            user_data,
            wellness_history,
            user,
            profile,
        })
    }

    /// Oracle-written insights over the user's history, with a rule-based
    /// fallback.
    pub async fn insights(&self, user_id: i64) -> Result<Value> {
        let user = self.user(user_id).await?;
        let profile = self.db.get_profile(user_id).await?;
        let sessions = self.db.completed_sessions(user_id).await?;
        let impacts = self.db.recent_frame_impacts(user_id, RECENT_SESSIONS).await?;
        let data = aggregation::gather_user_data(&sessions, &impacts);
        Ok(insights::comprehensive_insights(&*self.oracle, &user, profile.as_ref(), data.as_ref()).await)
    }

    pub async fn app_detail(&self, user_id: i64, app_name: &str) -> Result<Option<AppDetail>> {
        let frames = self.db.app_frames(user_id, app_name).await?;
        Ok(analytics::app_detail(app_name, &frames))
    }

    pub async fn knowledge_graph(&self, user_id: i64) -> Result<Option<StoredGraph>> {
        self.db.get_graph(user_id).await
    }

    // Periodic check-ins

    pub async fn check_in<I, K>(&self, user_id: i64, kind: AssessmentKind, raw: I) -> Result<PeriodicAssessment>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<str>,
    {
        self.check_in_on(user_id, kind, raw, Utc::now().date_naive()).await
    }

    /// Record the check-in for the period containing `today`, replacing an
    /// earlier one of the same period.
    pub async fn check_in_on<I, K>(
        &self,
        user_id: i64,
        kind: AssessmentKind,
        raw: I,
        today: NaiveDate,
    ) -> Result<PeriodicAssessment>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<str>,
    {
        self.user(user_id).await?;
        let responses = assessment::normalize_responses(kind, raw);

        let previous_key = assessment::previous_period_key(kind, today);
        let previous_overall = self
            .db
            .get_assessment(user_id, kind, &previous_key)
            .await?
            .map(|a| a.scores.overall_wellness);
        let traits = match kind {
            AssessmentKind::Monthly => self.db.get_profile(user_id).await?.map(|p| p.results.traits),
            AssessmentKind::Weekly => None,
        };

        let check_in = assessment::score_check_in(kind, responses, previous_overall, traits.as_ref(), today);
        self.db.upsert_assessment(user_id, check_in).await
    }

    pub async fn assessment_history(&self, user_id: i64) -> Result<AssessmentHistory> {
        self.assessment_history_on(user_id, Utc::now().date_naive()).await
    }

    pub async fn assessment_history_on(&self, user_id: i64, today: NaiveDate) -> Result<AssessmentHistory> {
        let limit = assessment::HISTORY_LIMIT;
        let weekly = self
            .db
            .latest_assessments(user_id, AssessmentKind::Weekly, limit)
            .await?;
        let monthly = self
            .db
            .latest_assessments(user_id, AssessmentKind::Monthly, limit)
            .await?;
        Ok(assessment::history(weekly, monthly, today))
    }

    /// Rebuild and store the user's graph. A failure is logged and does not
    /// undo the write that triggered it.
    async fn refresh_graph(&self, user_id: i64) {
        if let Err(err) = self.rebuild_graph(user_id).await {
            warn!("Knowledge graph refresh failed for user {user_id}: {err:#}");
        }
    }

    pub async fn rebuild_graph(&self, user_id: i64) -> Result<StoredGraph> {
        let user = self.user(user_id).await?;
        let profile = self.db.get_profile(user_id).await?;
        let sessions = self.db.completed_sessions(user_id).await?;
        let graph = graph::build_graph(&user, profile.as_ref(), &sessions);
        self.db.save_graph(user_id, graph, Utc::now()).await
    }
}
