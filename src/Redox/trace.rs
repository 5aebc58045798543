//! Collector for the intermediate results of a balancing run.
//!
//! The balancing functions never print. A caller that wants to see the intermediate oxidation
//! states, detected half-reactions and added species passes an enabled [`Trace`] and renders it
//! afterwards; every step is also sent to the `log` facade at debug level.
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub step: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Trace {
    enabled: bool,
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Self {
            enabled: true,
            entries: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, step: &str, message: impl Into<String>) {
        let message = message.into();
        debug!("[{}] {}", step, message);
        if self.enabled {
            self.entries.push(TraceEntry {
                step: step.to_string(),
                message,
            });
        }
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("[{}] {}", e.step, e.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_trace_keeps_entries() {
        let mut trace = Trace::new();
        trace.record("parse", "reactants [Fe, O2]");
        trace.record("scale", format!("lcm {}", 12));
        assert_eq!(trace.entries().len(), 2);
        assert_eq!(trace.entries()[1].message, "lcm 12");
        assert_eq!(trace.render(), "[parse] reactants [Fe, O2]\n[scale] lcm 12");
    }

    #[test]
    fn test_disabled_trace_records_nothing() {
        let mut trace = Trace::disabled();
        trace.record("parse", "ignored");
        assert!(!trace.is_enabled());
        assert!(trace.entries().is_empty());
        assert_eq!(trace.render(), "");
    }
}
