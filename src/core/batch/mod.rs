//! Batch engine: map source paths to destinations, enumerate the tasks a
//! run still needs, and execute them on a bounded worker pool.
pub mod enumerate;
pub mod path_map;
pub mod pool;
pub mod report;

pub use enumerate::{Enumeration, SkipCounts, Task, enumerate_tasks};
pub use path_map::{ACCEPTED_EXTENSIONS, PathMapper};
pub use pool::{CancelToken, Progress, WorkerPool};
pub use report::{BatchReport, TaskOutcome, TaskReport};
