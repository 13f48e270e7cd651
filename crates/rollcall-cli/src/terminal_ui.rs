use std::io::{self, Write};

use rollcall_core::{Progress, RecognitionEvent, UiSurface};

const BAR_WIDTH: usize = 20;

/// Line-oriented UI: every change is printed to stdout, errors to stderr.
#[derive(Default)]
pub struct TerminalUi {
    status: String,
    progress: u8,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn render(&self) {
        println!("{} {}", progress_bar(self.progress), self.status);
        io::stdout().flush().ok();
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

impl UiSurface for TerminalUi {
    fn set_status(&mut self, text: &str) {
        if self.status != text {
            self.status = text.to_string();
            self.render();
        }
    }

    fn set_progress(&mut self, progress: Progress) {
        let percent = progress.percent();
        if self.progress != percent {
            self.progress = percent;
            self.render();
        }
    }

    fn set_mark_status(&mut self, text: &str) {
        println!("  {text}");
    }

    fn set_controls(&mut self, running: bool) {
        tracing::debug!(running, "controls updated");
    }

    fn prepend_recognition(&mut self, event: &RecognitionEvent) {
        println!("  + {}", event.log_line());
    }

    fn notify_error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }
}
