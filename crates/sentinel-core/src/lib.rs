// ABOUTME: Ensemble decision engine: wrappers, fallback, scoring, context, cache
//! Everything needed to turn one message (plus optional history) into a
//! crisis assessment: the four-model fan-out (`wrapper`), per-model health
//! tracking (`fallback`), the pure fusion function (`scoring`), temporal
//! and escalation analysis (`context`), the bounded response cache
//! (`cache`), alert delivery (`alerting`), request validation
//! (`adapter`), explanation text (`explain`), the wire response shapes
//! (`response`), runtime configuration (`config`), and the orchestrator
//! tying all of it together for one request (`engine`).

pub mod adapter;
pub mod alerting;
pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod explain;
pub mod fallback;
pub mod http_wrapper;
pub mod response;
pub mod scoring;
pub mod wrapper;

pub use adapter::{NormalizedRequest, RawHistoryItem};
pub use alerting::{AlertEvent, AlertingHook};
pub use cache::ResponseCache;
pub use config::ConfigView;
pub use engine::{DecisionEngine, RawAnalyzeRequest, Wrappers};
pub use fallback::FallbackController;
pub use http_wrapper::HttpModelWrapper;
pub use response::AnalyzeResponse;
pub use scoring::{score, score_with_consensus, VoteBreakdown};
pub use wrapper::{classify, ModelWrapper, RawClassification};
