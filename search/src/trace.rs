//! Diagnostic trace events and sinks.
//!
//! The driver emits [`TraceEvent`]s gated by the `trace_rules`, `trace` and
//! `trace_summary` config flags. Sinks are observational: nothing they do
//! feeds back into the search.

use std::io;

use crate::state::SearchStatistics;

/// One diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// One rule table entry, emitted before the search starts.
    RuleListed {
        index: usize,
        name: String,
        reversed: bool,
        pattern: String,
        template: String,
    },
    /// Emitted after `startup`.
    Startup {
        strategy_id: String,
        lhs: String,
        rhs: String,
    },
    /// Emitted after each `step` call.
    Step {
        iteration: u64,
        outcome: &'static str,
        vertices: usize,
        edges: usize,
    },
    /// Emitted once at the end of the run.
    Summary {
        termination: &'static str,
        stats: SearchStatistics,
        vertices: usize,
        edges: usize,
    },
}

impl TraceEvent {
    /// Single-line human-readable rendering.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::RuleListed {
                index,
                name,
                reversed,
                pattern,
                template,
            } => {
                let arrow = if *reversed { "<-" } else { "->" };
                format!("rule[{index}] {name} {arrow} : {pattern} => {template}")
            }
            Self::Startup {
                strategy_id,
                lhs,
                rhs,
            } => format!("startup strategy={strategy_id} lhs={lhs} rhs={rhs}"),
            Self::Step {
                iteration,
                outcome,
                vertices,
                edges,
            } => format!("step {iteration}: {outcome} (vertices={vertices} edges={edges})"),
            Self::Summary {
                termination,
                stats,
                vertices,
                edges,
            } => format!(
                "summary termination={termination} iterations={} expansions={} \
                 rule_applications={} duplicates={} bridges={} vertices={vertices} edges={edges}",
                stats.iterations,
                stats.expansions,
                stats.rule_applications,
                stats.duplicates,
                stats.bridges,
            ),
        }
    }
}

/// Receives trace events from the driver.
pub trait TraceSink {
    fn on_event(&mut self, event: &TraceEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: &TraceEvent) {}
}

/// Collects rendered lines in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferedTraceSink {
    lines: Vec<String>,
}

impl BufferedTraceSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines joined with `\n`, with a trailing newline when non-empty.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl TraceSink for BufferedTraceSink {
    fn on_event(&mut self, event: &TraceEvent) {
        self.lines.push(event.render());
    }
}

/// Writes rendered lines to an `io::Write`.
///
/// Write errors are not propagated into the search. The first one is kept
/// and later events are dropped; callers check [`WriterTraceSink::take_error`].
#[derive(Debug)]
pub struct WriterTraceSink<W: io::Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: io::Write> WriterTraceSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> TraceSink for WriterTraceSink<W> {
    fn on_event(&mut self, event: &TraceEvent) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{}", event.render()) {
            self.error = Some(e);
        }
    }
}
