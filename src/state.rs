//! Request state and the reducer that drives it
//!
//! All display state for a fetch lives in one [`RequestState`] value. The
//! [`RecommendationController`] is the only thing that changes it, and it
//! tags every dispatched request with a sequence number so that a slow,
//! older response can never overwrite a newer one.

use crate::api::FetchError;

pub const EMPTY_ID_MESSAGE: &str = "Please enter a valid User ID.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch recommendations. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    /// A request is outstanding; `shown` is whatever was on screen before it.
    /// `error` is a validation error raised while waiting.
    Loading {
        shown: Vec<String>,
        error: Option<String>,
    },
    Success(Vec<String>),
    /// `shown` survives the failure so the previous results stay visible
    Failed { message: String, shown: Vec<String> },
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failed { message, .. } => Some(message),
            RequestState::Loading { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn recommendations(&self) -> &[String] {
        match self {
            RequestState::Idle => &[],
            RequestState::Loading { shown, .. } | RequestState::Failed { shown, .. } => shown,
            RequestState::Success(list) => list,
        }
    }

    fn take_shown(&mut self) -> Vec<String> {
        match std::mem::take(self) {
            RequestState::Idle => Vec::new(),
            RequestState::Loading { shown, .. }
            | RequestState::Failed { shown, .. }
            | RequestState::Success(shown) => shown,
        }
    }
}

/// A request the caller must actually perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub user_id: String,
}

/// Result of a performed [`FetchRequest`]
#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub result: Result<Vec<String>, FetchError>,
}

#[derive(Debug, Default)]
pub struct RecommendationController {
    state: RequestState,
    latest_seq: u64,
    // Sequence number of the request the display is waiting on
    pending: Option<u64>,
}

impl RecommendationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Validate `user_id` and, if it is usable, move to loading and hand
    /// back the request to perform. Empty or whitespace-only ids fail
    /// locally and produce no request; a request already in flight keeps
    /// loading and still applies when it lands.
    pub fn submit(&mut self, user_id: &str) -> Option<FetchRequest> {
        let shown = self.state.take_shown();

        if user_id.trim().is_empty() {
            tracing::debug!("rejected empty user id");
            let message = EMPTY_ID_MESSAGE.to_string();
            self.state = if self.pending.is_some() {
                RequestState::Loading {
                    shown,
                    error: Some(message),
                }
            } else {
                RequestState::Failed { message, shown }
            };
            return None;
        }

        self.latest_seq += 1;
        self.pending = Some(self.latest_seq);
        self.state = RequestState::Loading { shown, error: None };
        tracing::info!(seq = self.latest_seq, user_id, "fetching recommendations");

        Some(FetchRequest {
            seq: self.latest_seq,
            user_id: user_id.to_string(),
        })
    }

    /// Apply a finished request. Returns `false` when the outcome was stale
    /// and ignored.
    pub fn resolve(&mut self, outcome: FetchOutcome) -> bool {
        if self.pending != Some(outcome.seq) {
            tracing::debug!(
                seq = outcome.seq,
                latest = self.latest_seq,
                "discarding stale response"
            );
            return false;
        }
        self.pending = None;

        self.state = match outcome.result {
            Ok(list) => {
                tracing::info!(seq = outcome.seq, count = list.len(), "recommendations received");
                RequestState::Success(list)
            }
            Err(e) => {
                tracing::error!(seq = outcome.seq, "Error fetching recommendations: {}", e);
                RequestState::Failed {
                    message: FETCH_FAILED_MESSAGE.to_string(),
                    shown: self.state.take_shown(),
                }
            }
        };
        true
    }
}
