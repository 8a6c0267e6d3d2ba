use colored::Colorize;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::time::Duration;

use xmlscout::{metrics::WorkerSnapshot, ProgressSink, ProgressSnapshot};

/// Redraws the scan status on the terminal on every tick
#[derive(Debug, Default)]
pub struct TerminalSink;

impl TerminalSink {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressSink for TerminalSink {
    fn update(&self, snapshot: &ProgressSnapshot) {
        let mut stdout = io::stdout().lock();
        // A failed redraw is not worth stopping the scan for
        let _ = execute!(stdout, Clear(ClearType::All), MoveTo(0, 0));
        let _ = writeln!(stdout, "{}", status_line(snapshot).bold());
        for line in worker_lines(&snapshot.workers) {
            let _ = writeln!(stdout, "{}", line.cyan());
        }
        let _ = stdout.flush();
    }

    fn finish(&self, snapshot: &ProgressSnapshot) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(
            stdout,
            "\nTime taken for search: {} seconds.",
            seconds(snapshot.elapsed)
        );
        for line in worker_lines(&snapshot.workers) {
            let _ = writeln!(stdout, "{}", line.cyan());
        }
        let _ = stdout.flush();
    }
}

pub fn status_line(snapshot: &ProgressSnapshot) -> String {
    format!(
        "Scanned {} files. Time elapsed: {} seconds.",
        snapshot.files_scanned,
        seconds(snapshot.elapsed)
    )
}

/// One line per worker that has timed at least one file
pub fn worker_lines(workers: &[WorkerSnapshot]) -> Vec<String> {
    workers
        .iter()
        .filter_map(|worker| {
            worker.median.map(|median| {
                format!(
                    "Thread {} processed {} files with a median time of {} seconds per file.",
                    worker.worker,
                    worker.files_processed,
                    seconds(median)
                )
            })
        })
        .collect()
}

fn seconds(duration: Duration) -> String {
    format!("{:.6}", duration.as_secs_f64())
}
