//! Rate limiter adapters.
//!
//! ## Available Adapters
//!
//! - `SlidingWindowRateLimiter` - In-process sliding-window limiter
//! - `RateLimiterJanitor` - Background purge of idle keys
//!
//! ## Usage
//!
//! ```ignore
//! use feedback_interviews::adapters::rate_limiter::{
//!     RateLimiterJanitor, RateLimiterJanitorConfig, SlidingWindowRateLimiter,
//! };
//!
//! let limiter = Arc::new(SlidingWindowRateLimiter::new());
//! let janitor = RateLimiterJanitor::new(limiter.clone(), RateLimiterJanitorConfig::default());
//! tokio::spawn(async move { janitor.run(shutdown_rx).await });
//! ```

mod clock;
mod janitor;
mod sliding_window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use janitor::{RateLimiterJanitor, RateLimiterJanitorConfig};
pub use sliding_window::{SlidingWindowRateLimiter, WindowDecision};
