pub mod rate_limit;
pub mod token_bucket;
pub use rate_limit::RateLimiter;
pub use token_bucket::{Grant, TokenBucket};
