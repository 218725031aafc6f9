use chrono::{DateTime, Utc};

use super::core::AggregateRoot;
use super::message::OutboxMessage;

// ============================================================================
// Outbox Recorder
// ============================================================================
//
// Runs inside save_changes, before the commit. An aggregate's queue is only
// cleared once every one of its events serialized, so a failure leaves the
// aggregate untouched and the transaction is abandoned.
//
// ============================================================================

pub struct OutboxRecorder;

impl OutboxRecorder {
    pub fn record<A: AggregateRoot>(
        aggregate: &mut A,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutboxMessage>, serde_json::Error> {
        let messages = aggregate
            .domain_events()
            .iter()
            .map(|event| OutboxMessage::from_event(event, now))
            .collect::<Result<Vec<_>, _>>()?;

        if !messages.is_empty() {
            tracing::debug!(
                aggregate_id = %aggregate.aggregate_id(),
                event_count = messages.len(),
                "Recorded domain events into outbox"
            );
        }

        aggregate.clear_domain_events();
        Ok(messages)
    }

    pub fn record_all<'a, A, I>(aggregates: I, now: DateTime<Utc>) -> Result<Vec<OutboxMessage>, serde_json::Error>
    where
        A: AggregateRoot + 'a,
        I: IntoIterator<Item = &'a mut A>,
    {
        let mut messages = Vec::new();
        for aggregate in aggregates {
            messages.extend(Self::record(aggregate, now)?);
        }
        Ok(messages)
    }
}
