//! Training pipeline abstractions
//!
//! This module provides the composable pieces of a training run:
//! - Driving episodes against a generated maze
//! - Recording observations during training
//! - Summarizing run statistics

pub mod observers;
pub mod training;

// Re-export observer implementations (adapters)
pub use observers::{
    EpisodeRecord, JsonlObserver, MetricsObserver, MetricsSummary, MilestoneObserver,
    ProgressObserver, WindowMetrics,
};
pub use training::{TrainingConfig, TrainingDriver, TrainingReport, TrainingStatistics};

pub use crate::ports::TrainingObserver;
