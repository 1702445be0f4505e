//! Observability hooks for remote calls and reply dispatch.
//!
//! ```rust
//! use pobserve::{MetricsObservabilityHooks, SafeDispatchHooks, TracingObservabilityHooks};
//!
//! let _dispatch_hooks = SafeDispatchHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod fanout_hooks;
mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use fanout_hooks::FanoutHooks;
pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeDispatchHooks, SafeProviderHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        FanoutHooks, MetricsObservabilityHooks, SafeDispatchHooks, SafeProviderHooks,
        TracingObservabilityHooks,
    };
}
