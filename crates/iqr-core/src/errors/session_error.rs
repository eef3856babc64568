/// Session engine errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("no positive descriptors to query the neighbor index with")]
    NoPositiveExamples,

    #[error("did not find at least one positive adjudication")]
    NoAdjudications,

    #[error("descriptor {uid} has no vector")]
    MissingVector { uid: String },

    #[error("ranking returned {actual} scores for a pool of {expected}")]
    RankingShapeMismatch { expected: usize, actual: usize },

    #[error("ranking returned non-finite score {score} for descriptor {uid}")]
    NonFiniteScore { uid: String, score: f64 },

    #[error("ranking proposed feedback descriptor {uid} which is not in the working set")]
    UnknownFeedbackDescriptor { uid: String },

    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("session already exists: {session_id}")]
    SessionExists { session_id: String },
}
