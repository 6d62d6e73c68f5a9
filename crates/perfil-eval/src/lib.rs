// Evaluation engine: dataset loading, population statistics, Z-scores,
// clinical bands and report assembly.

pub mod cache;
pub mod chart;
pub mod classify;
pub mod dataset;
pub mod export;
pub mod metrics;
pub mod population;
pub mod report;
pub mod stats;
pub mod zscore;
