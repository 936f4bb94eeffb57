pub mod engine;

pub use engine::{AuditEngine, StageInfo};
