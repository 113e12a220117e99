use ratchet_core::report::{Report, Reporter};

/// One call received by a [`MemoryReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Plan(usize),
    Report(Report),
}

/// Records every plan and report in arrival order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Vec<Event>,
    hard_failures: usize,
    finished: bool,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The first announced plan, if any.
    pub fn planned(&self) -> Option<usize> {
        self.events.iter().find_map(|e| match e {
            Event::Plan(n) => Some(*n),
            Event::Report(_) => None,
        })
    }

    pub fn reports(&self) -> Vec<&Report> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Report(r) => Some(r),
                Event::Plan(_) => None,
            })
            .collect()
    }

    pub fn report_named(&self, name: &str) -> Option<&Report> {
        self.reports().into_iter().find(|r| r.name() == name)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Reporter for MemoryReporter {
    fn plan(&mut self, count: usize) {
        self.events.push(Event::Plan(count));
    }

    fn report(&mut self, report: Report) {
        if report.is_hard_failure() {
            self.hard_failures += 1;
        }
        self.events.push(Event::Report(report));
    }

    fn hard_failures(&self) -> usize {
        self.hard_failures
    }

    fn finish(&mut self) -> std::io::Result<()> {
        self.finished = true;
        Ok(())
    }
}
