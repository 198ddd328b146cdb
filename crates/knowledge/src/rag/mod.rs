//! Retrieval-augmented answering: gate, generation, web fallback and the pipeline.

pub mod gate;
pub mod generate;
pub mod pipeline;
pub mod web;

pub use gate::{GateDecision, RelevanceVerdict, SufficiencyGate};
pub use generate::AnswerGenerator;
pub use pipeline::CoachPipeline;
pub use web::{WebFallback, WebFetch};
