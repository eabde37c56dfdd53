// Logger context object and its initialize-once holder
pub mod logger;

// Performance memory accumulation and JSON load/flush
pub mod performance_log;

pub use logger::{DictOptions, Logger, LoggerSlot};
pub use performance_log::PerformanceLog;
