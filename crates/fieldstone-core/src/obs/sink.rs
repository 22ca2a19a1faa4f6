use crate::error::Error;
use std::cell::RefCell;

thread_local! {
    static COUNTERS: RefCell<EventReport> = RefCell::new(EventReport::default());
}

///
/// OpKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpKind {
    DefinitionWrite,
    ValueRead,
    ValueWrite,
    ValueDelete,
    SubmissionWrite,
    SubmissionDelete,
    Export,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    Completed { kind: OpKind },
    Failed { kind: OpKind },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// EventReport
/// Point-in-time snapshot of the thread's operation counters.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EventReport {
    pub definition_writes: u64,
    pub value_reads: u64,
    pub value_writes: u64,
    pub value_deletes: u64,
    pub submission_writes: u64,
    pub submission_deletes: u64,
    pub exports: u64,
    pub failures: u64,
}

///
/// CounterSink
/// Default sink: bumps the thread-local counters.
///

struct CounterSink;

impl MetricsSink for CounterSink {
    fn record(&self, event: MetricsEvent) {
        COUNTERS.with_borrow_mut(|counters| match event {
            MetricsEvent::Completed { kind } => {
                let slot = match kind {
                    OpKind::DefinitionWrite => &mut counters.definition_writes,
                    OpKind::ValueRead => &mut counters.value_reads,
                    OpKind::ValueWrite => &mut counters.value_writes,
                    OpKind::ValueDelete => &mut counters.value_deletes,
                    OpKind::SubmissionWrite => &mut counters.submission_writes,
                    OpKind::SubmissionDelete => &mut counters.submission_deletes,
                    OpKind::Export => &mut counters.exports,
                };
                *slot += 1;
            }
            MetricsEvent::Failed { .. } => counters.failures += 1,
        });
    }
}

/// Route one event to the sink.
pub(crate) fn record(event: MetricsEvent) {
    CounterSink.record(event);
}

/// Record the outcome of one operation and hand the result back.
pub(crate) fn track<T>(kind: OpKind, result: Result<T, Error>) -> Result<T, Error> {
    match &result {
        Ok(_) => record(MetricsEvent::Completed { kind }),
        Err(_) => record(MetricsEvent::Failed { kind }),
    }
    result
}

/// Snapshot the current thread's counters.
#[must_use]
pub fn metrics_report() -> EventReport {
    COUNTERS.with_borrow(|counters| *counters)
}

/// Zero the current thread's counters.
pub fn metrics_reset() {
    COUNTERS.with_borrow_mut(|counters| *counters = EventReport::default());
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn completed_and_failed_land_in_separate_slots() {
        metrics_reset();

        let _ = track(OpKind::ValueWrite, Ok::<_, Error>(()));
        let _ = track(OpKind::ValueWrite, Ok::<_, Error>(()));
        let _ = track(
            OpKind::ValueWrite,
            Err::<(), _>(Error::value_not_found("unknown field key: 'x'")),
        );

        let report = metrics_report();
        assert_eq!(report.value_writes, 2);
        assert_eq!(report.failures, 1);

        metrics_reset();
        assert_eq!(metrics_report(), EventReport::default());
    }
}
