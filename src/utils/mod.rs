pub mod cancellation;
pub mod circuit_breaker;
pub mod retry;

pub use cancellation::{CancellationSource, CancellationToken};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
pub use retry::{retry_on_transient, retry_with_backoff, IsTransient, RetryConfig, RetryResult};
