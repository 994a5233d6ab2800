pub mod assessment;
pub mod frame;
pub mod graph;
pub mod quiz;
pub mod session;
pub mod user;

pub use assessment::{AssessmentKind, AssessmentScores, PeriodicAssessment};
pub use frame::{AnalysisSource, ContentCategory, EngagementFlags, FrameRecord, Sentiment, WellnessImpact};
pub use graph::{GraphEdge, GraphNode, KnowledgeGraph, StoredGraph};
pub use quiz::{PersonalityProfile, QuizResponse, WellnessHistoryEntry};
pub use session::{ScreenSession, SessionStatus, SessionSummary};
pub use user::{NewUser, User};
