use std::io::{self, Write};

use ratchet_core::report::{Report, Reporter};
use serde::Serialize;

/// Tallies by report status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JsonSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub todo: usize,
}

#[derive(Serialize)]
struct Document<'a> {
    plan: Option<usize>,
    results: &'a [Report],
    summary: &'a JsonSummary,
}

/// Buffers every report and writes one pretty JSON document on `finish`.
pub struct JsonReporter<W: Write> {
    out: W,
    planned: Option<usize>,
    results: Vec<Report>,
    summary: JsonSummary,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            planned: None,
            results: Vec::new(),
            summary: JsonSummary::default(),
        }
    }

    pub fn summary(&self) -> &JsonSummary {
        &self.summary
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn plan(&mut self, count: usize) {
        self.planned.get_or_insert(count);
    }

    fn report(&mut self, report: Report) {
        self.summary.total += 1;
        match &report {
            Report::Pass { .. } => self.summary.passed += 1,
            Report::Fail { .. } => self.summary.failed += 1,
            Report::ExpectedFail { .. } => self.summary.todo += 1,
        }
        self.results.push(report);
    }

    fn hard_failures(&self) -> usize {
        self.summary.failed
    }

    fn finish(&mut self) -> io::Result<()> {
        let doc = Document {
            plan: self.planned,
            results: &self.results,
            summary: &self.summary,
        };
        serde_json::to_writer_pretty(&mut self.out, &doc)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
