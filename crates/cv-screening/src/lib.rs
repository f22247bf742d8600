//! Résumé screening: turns raw CV documents and a job's requirements into a
//! deterministic assessment, and hosts the application workflow around it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
