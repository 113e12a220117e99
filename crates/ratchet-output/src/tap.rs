use std::io::{self, Write};

use ratchet_core::report::{Report, Reporter};

/// Writes results as TAP.
///
/// Hard-failure diagnostics go to the diagnostic stream; TODO diagnostics stay
/// inline with the results, the way TAP producers conventionally split them.
/// Write errors are held until [`Reporter::finish`].
pub struct TapReporter<W: Write, D: Write> {
    out: W,
    diag: D,
    planned: Option<usize>,
    emitted: usize,
    hard_failures: usize,
    error: Option<io::Error>,
}

impl TapReporter<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<W: Write, D: Write> TapReporter<W, D> {
    pub fn new(out: W, diag: D) -> Self {
        Self {
            out,
            diag,
            planned: None,
            emitted: 0,
            hard_failures: 0,
            error: None,
        }
    }

    /// Consume the reporter, returning both writers.
    pub fn into_inner(self) -> (W, D) {
        (self.out, self.diag)
    }

    fn write_result(&mut self, report: &Report) -> io::Result<()> {
        let n = self.emitted;
        let name = escape(report.name());
        match report {
            Report::Pass { .. } => writeln!(self.out, "ok {} - {}", n, name),
            Report::Fail { diagnostics, .. } => {
                writeln!(self.out, "not ok {} - {}", n, name)?;
                write_comments(&mut self.diag, diagnostics)
            }
            Report::ExpectedFail {
                diagnostics,
                reason,
                ..
            } => {
                writeln!(self.out, "not ok {} - {} # TODO {}", n, name, escape(reason))?;
                write_comments(&mut self.out, diagnostics)
            }
        }
    }

    fn keep_error(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
    }
}

impl<W: Write, D: Write> Reporter for TapReporter<W, D> {
    fn plan(&mut self, count: usize) {
        if self.planned.is_some() {
            return;
        }
        self.planned = Some(count);
        let result = writeln!(self.out, "1..{}", count);
        self.keep_error(result);
    }

    fn report(&mut self, report: Report) {
        self.emitted += 1;
        if report.is_hard_failure() {
            self.hard_failures += 1;
        }
        let result = self.write_result(&report);
        self.keep_error(result);
    }

    fn hard_failures(&self) -> usize {
        self.hard_failures
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.planned.is_none() {
            let result = writeln!(self.out, "1..{}", self.emitted);
            self.keep_error(result);
        }
        if self.hard_failures > 0 {
            let result = writeln!(
                self.diag,
                "# Looks like you failed {} test(s) of {}.",
                self.hard_failures, self.emitted
            );
            self.keep_error(result);
        }
        let result = self.out.flush().and_then(|_| self.diag.flush());
        self.keep_error(result);
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// `#` starts a directive in TAP, so it is escaped in names and reasons.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('#', "\\#")
}

fn write_comments<O: Write>(out: &mut O, lines: &[String]) -> io::Result<()> {
    for line in lines.iter().flat_map(|l| l.lines()) {
        writeln!(out, "# {}", line)?;
    }
    Ok(())
}
