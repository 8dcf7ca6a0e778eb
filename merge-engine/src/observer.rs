//! Opt-in dispatch observation.
//!
//! Engines are silent by default. Attaching a [`MergeObserver`] reports
//! each classification and each rule dispatch.

use crate::value::Value;

pub trait MergeObserver: Send + Sync {
    fn on_classify(&self, _value: &Value, _label: &str) {}

    fn on_dispatch(&self, _left: &str, _right: &str) {}
}

/// Forwards observations to `tracing` at TRACE level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MergeObserver for TracingObserver {
    fn on_classify(&self, value: &Value, label: &str) {
        tracing::trace!(kind = value.kind_name(), label, "classified value");
    }

    fn on_dispatch(&self, left: &str, right: &str) {
        tracing::trace!(left, right, "dispatching merge rule");
    }
}
