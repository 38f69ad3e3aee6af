use log::{debug, warn};

use crate::subtitle::Event;

use super::TieredConverter;

// @module: Whole-document variant conversion with per-event fallback

/// How a document's events went through variant conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantOutcome {
    /// At least one conversion attempt failed
    pub degraded: bool,
    /// Texts were replaced from the single combined request
    pub combined: bool,
    /// Events converted by individual requests
    pub individually_converted: usize,
    /// Events whose individual request failed and kept the original text
    pub failed_events: usize,
}

/// Convert every event text in place.
///
/// All texts are first sent as one newline-joined request. When that succeeds
/// with one output line per event the lines replace the texts positionally;
/// an empty line keeps the original. Otherwise each non-blank event is sent on
/// its own and a failure only leaves that event untouched.
pub async fn convert_events(converter: &TieredConverter, events: &mut [Event], remote_priority: bool) -> VariantOutcome {
    let mut outcome = VariantOutcome::default();

    if !events.iter().any(Event::has_text) {
        debug!("No event text to convert");
        return outcome;
    }

    let joined = events
        .iter()
        .map(|e| if e.has_text() { e.text.as_str() } else { "" })
        .collect::<Vec<_>>()
        .join("\n");

    let (converted, ok) = converter.convert(&joined, remote_priority).await;
    if ok {
        let lines: Vec<&str> = converted.split('\n').collect();
        if lines.len() == events.len() {
            for (event, line) in events.iter_mut().zip(lines) {
                if !line.is_empty() {
                    event.text = line.to_string();
                }
            }
            outcome.combined = true;
            return outcome;
        }
        debug!(
            "Combined conversion returned {} lines for {} events, converting individually",
            lines.len(),
            events.len()
        );
    } else {
        outcome.degraded = true;
    }

    for event in events.iter_mut().filter(|e| e.has_text()) {
        let (text, ok) = converter.convert(&event.text, remote_priority).await;
        if ok {
            event.text = text;
            outcome.individually_converted += 1;
        } else {
            outcome.failed_events += 1;
            outcome.degraded = true;
        }
    }

    if outcome.failed_events > 0 {
        warn!("{} events kept their original text", outcome.failed_events);
    }
    outcome
}
