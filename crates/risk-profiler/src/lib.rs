//! Investor risk profiling: questionnaire scoring, bucket classification, and the
//! persistence adapters that record each assessment.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
