//! Observability: submission counters behind a sink boundary.
//!
//! Form orchestration MUST NOT touch counter state directly; all
//! instrumentation flows through `MetricsEvent` and `MetricsSink`. This
//! module is the only bridge between submission logic and the counters.

use crate::lifecycle::Op;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    SubmitStart {
        op: Op,
        form_path: &'static str,
    },
    SubmitFinish {
        op: Op,
        form_path: &'static str,
        valid: bool,
    },
    CoercionFailure {
        form_path: &'static str,
    },
    StoreConstraint {
        form_path: &'static str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// EventState
/// Ephemeral, in-memory counters for submissions.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub forms: BTreeMap<String, FormCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    pub create_calls: u64,
    pub update_calls: u64,
    pub invalid_submissions: u64,
    pub coercion_failures: u64,
    pub store_constraints: u64,
}

///
/// FormCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FormCounters {
    pub create_calls: u64,
    pub update_calls: u64,
    pub invalid_submissions: u64,
    pub coercion_failures: u64,
    pub store_constraints: u64,
}

fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// GlobalMetricsSink
/// Default process-local sink that writes into thread-local state.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::SubmitStart { op, form_path } => with_state_mut(|m| {
                let entry = m.forms.entry(form_path.to_string()).or_default();
                match op {
                    Op::Create => {
                        m.ops.create_calls = m.ops.create_calls.saturating_add(1);
                        entry.create_calls = entry.create_calls.saturating_add(1);
                    }
                    Op::Update => {
                        m.ops.update_calls = m.ops.update_calls.saturating_add(1);
                        entry.update_calls = entry.update_calls.saturating_add(1);
                    }
                }
            }),

            MetricsEvent::SubmitFinish {
                form_path, valid, ..
            } => {
                if !valid {
                    with_state_mut(|m| {
                        m.ops.invalid_submissions = m.ops.invalid_submissions.saturating_add(1);
                        let entry = m.forms.entry(form_path.to_string()).or_default();
                        entry.invalid_submissions = entry.invalid_submissions.saturating_add(1);
                    });
                }
            }

            MetricsEvent::CoercionFailure { form_path } => with_state_mut(|m| {
                m.ops.coercion_failures = m.ops.coercion_failures.saturating_add(1);
                let entry = m.forms.entry(form_path.to_string()).or_default();
                entry.coercion_failures = entry.coercion_failures.saturating_add(1);
            }),

            MetricsEvent::StoreConstraint { form_path } => with_state_mut(|m| {
                m.ops.store_constraints = m.ops.store_constraints.saturating_add(1);
                let entry = m.forms.entry(form_path.to_string()).or_default();
                entry.store_constraints = entry.store_constraints.saturating_add(1);
            }),
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in
        //   `with_metrics_sink`, which restores the previous pointer on all
        //   exits including unwind.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        // - Only a shared reference is materialized, matching the shared
        //   borrow used to install the override.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> EventState {
    EVENT_STATE.with(|m| m.borrow().clone())
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - The pointer is installed only for this dynamic scope; `Guard`
    //   restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists it.
    let sink_ptr =
        unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}
