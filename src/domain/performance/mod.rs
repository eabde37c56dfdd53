// Performance memory: grouped, rectangular series of recorded values
pub mod describe;
pub mod store;

pub use describe::{describe_lines, render_value};
pub use store::{GroupSeries, PerformanceStore, Record};
