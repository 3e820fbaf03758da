use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use lanscope_common::signal::StopSignal;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Watches the keyboard for `q` or ctrl-c and raises a stop signal.
///
/// The terminal stays in raw mode while the handle is alive.
pub struct InputHandle {
    done: StopSignal,
    worker: Option<JoinHandle<()>>,
    raw_mode: bool,
}

impl InputHandle {
    pub fn new() -> Self {
        Self {
            done: StopSignal::new(),
            worker: None,
            raw_mode: false,
        }
    }

    pub fn start(&mut self, stop: StopSignal) {
        if self.worker.is_some() {
            return;
        }
        match terminal::enable_raw_mode() {
            Ok(()) => self.raw_mode = true,
            Err(e) => {
                tracing::debug!("keyboard input unavailable: {e}");
                return;
            }
        }

        let done = self.done.clone();
        self.worker = Some(thread::spawn(move || {
            while !done.is_stopped() && !stop.is_stopped() {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {
                        if let Ok(Event::Key(key)) = event::read() {
                            if is_stop_key(&key) {
                                stop.stop();
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        self.done.stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
            self.raw_mode = false;
        }
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn is_stop_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
