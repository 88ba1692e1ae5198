//! Small concurrency helpers shared across the workspace.

pub mod rate;
pub mod shutdown;
pub mod timer;

pub use rate::RateLimiter;
pub use shutdown::{shutdown_channel, ShutdownHandle, ShutdownSignal};
pub use timer::async_time_fn;
