use std::thread::{self, JoinHandle};
use std::time::Duration;

use colored::*;
use indicatif::ProgressStyle;
use lanscope_common::signal::StopSignal;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICK: Duration = Duration::from_millis(100);
const TIP_DURATION: Duration = Duration::from_secs(2);
const TIPS: &[&str] = &[
    "You can press 'q' to finish early",
    "Hosts that stay silent are retried once by default",
];

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ])
}

/// Spinner attached to `span`, alternating `message` with usage tips.
pub struct Spinner {
    done: StopSignal,
    worker: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start(span: Span, message: impl Into<String>) -> Self {
        span.pb_set_style(&spinner_style());
        let message: String = message.into();
        span.pb_set_message(&message);

        let done = StopSignal::new();
        let worker_done = done.clone();

        let worker = thread::spawn(move || {
            let mut tip_index = 0;
            let mut showing_tip = false;
            let mut waited = Duration::ZERO;
            while !worker_done.is_stopped() {
                thread::sleep(TICK);
                waited += TICK;
                if waited < TIP_DURATION {
                    continue;
                }
                waited = Duration::ZERO;

                if showing_tip {
                    span.pb_set_message(&message);
                } else {
                    let tip = TIPS[tip_index % TIPS.len()];
                    tip_index += 1;
                    span.pb_set_message(&format!("{}", tip.italic().white()));
                }
                showing_tip = !showing_tip;
            }
        });

        Self {
            done,
            worker: Some(worker),
        }
    }

    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.done.stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}
