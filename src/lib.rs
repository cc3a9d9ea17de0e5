//! # fx-change-monitor
//!
//! Significant-change detection for daily foreign-exchange rate series.
//!
//! Given a date-indexed series of rate observations, the engine finds every
//! windowed move that crosses a percentage threshold, classifies its
//! severity, and reduces the overlapping candidates to a compact,
//! chronologically ordered alert list.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: currencies, observations, change points, alerts
//! - **detection** — Change scanning, severity classification, overlap resolution
//! - **storage** — Rate and alert repositories (in-memory and JSON file backed)
//! - **pipeline** — Load → detect → persist orchestration per currency
//! - **simulation** — Synthetic rate series for testing and benchmarking

pub mod core;
pub mod detection;
pub mod pipeline;
pub mod simulation;
pub mod storage;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::alert::AlertRecord;
    pub use crate::core::change_point::{ChangePoint, Direction, Severity};
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::observation::{RateObservation, RateRecord};
    pub use crate::detection::detector::{detect_changes, ChangeDetector, DetectorConfig};
    pub use crate::detection::DetectionError;
    pub use crate::pipeline::{AlertPipeline, AnalysisOutcome, BatchStatus, PipelineConfig};
    pub use crate::storage::{AlertRepository, InMemoryStore, RateRepository};
}
