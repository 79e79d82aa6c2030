//! Core building blocks: processing parameters, the per-image transform
//! stages, and the batch engine (path mapping, task enumeration, worker
//! pool). These are consumed by the high-level `api` module.
pub mod batch;
pub mod params;
pub mod processing;
