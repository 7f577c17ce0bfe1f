//! Business logic services for the Prediction Oracle
//!
//! This crate provides the lifecycle orchestrator that composes fact
//! retrieval, generation, adjudication and transaction sequencing into the
//! creation and finalization flows.

pub mod lifecycle;

pub use lifecycle::{
    AdjudicationPreview, FinalizationReceipt, LifecycleOrchestrator, PredictionSubmission,
    SubmissionStatus,
};
