mod auth;
mod cache;
mod report;

pub use auth::TokenManager;
pub use cache::CacheStats;
pub use cache::CandidateCache;
pub use report::FailureReport;
