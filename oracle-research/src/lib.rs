//! Research layer for the Prediction Oracle
//!
//! This crate provides the language-model side of the lifecycle: a fact
//! provider client for current-information digests, a completion-model
//! client, and the two prompts built on top of them (prediction generation
//! and outcome adjudication).

pub mod adjudicator;
pub mod facts;
pub mod generator;
pub mod openai;

pub use adjudicator::{parse_verdict, OutcomeAdjudicator, ADJUDICATION_TEMPERATURE};
pub use facts::{FactProvider, PerplexityClient};
pub use generator::{PredictionGenerator, GENERATION_TEMPERATURE};
pub use openai::{CompletionModel, OpenAIClient};
