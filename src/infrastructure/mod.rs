pub mod console_style;
pub mod message_log;
pub mod performance_persistence;

pub use message_log::{Emission, MessageLog, MessageOptions, SourceLocation};
pub use performance_persistence::PerformancePersistence;
