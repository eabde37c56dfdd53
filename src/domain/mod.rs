// Message severity levels
pub mod level;

// Performance memory domain
pub mod performance;

// Domain-specific error types
pub mod errors;
