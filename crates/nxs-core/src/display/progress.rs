//! Progress display for server startup and other slow remote operations

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const SPINNER_UPDATE_INTERVAL_MS: u64 = 100;
const CLEAR_LINE_WIDTH: usize = 100;

/// Spinner drawn on stderr so stdout stays machine-readable.
///
/// Nothing is drawn when stderr is not a terminal.
pub struct ProgressSpinner {
    message: String,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    enabled: bool,
}

impl ProgressSpinner {
    pub fn new(message: String) -> Self {
        Self {
            message,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            enabled: atty::is(atty::Stream::Stderr),
        }
    }

    pub fn start(&mut self) {
        if !self.enabled || self.handle.is_some() {
            return;
        }
        self.running.store(true, Ordering::Relaxed);
        let running = Arc::clone(&self.running);
        let message = self.message.clone();

        let handle = thread::spawn(move || {
            let spinner_chars = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
            let mut index = 0;
            let mut stderr = io::stderr();

            while running.load(Ordering::Relaxed) {
                let _ = write!(stderr, "\r{} {}", spinner_chars[index], message);
                let _ = stderr.flush();
                index = (index + 1) % spinner_chars.len();
                thread::sleep(Duration::from_millis(SPINNER_UPDATE_INTERVAL_MS));
            }

            let _ = write!(stderr, "\r{:<width$}\r", "", width = CLEAR_LINE_WIDTH);
            let _ = stderr.flush();
        });

        self.handle = Some(handle);
    }

    /// Stop the spinner, optionally leaving a final line on stderr.
    pub fn stop(&mut self, completion_message: Option<&str>) {
        self.running.store(false, Ordering::Relaxed);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        if let Some(msg) = completion_message {
            if self.enabled {
                eprintln!("{}", msg);
            }
        }
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        self.stop(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_start_stop() {
        let mut spinner = ProgressSpinner::new("Starting NXSDataWriter/haso000".to_string());
        spinner.start();
        spinner.start();
        spinner.stop(None);
        assert!(spinner.handle.is_none());
        assert!(!spinner.running.load(Ordering::Relaxed));
    }

    #[test]
    fn test_stop_without_start() {
        let mut spinner = ProgressSpinner::new("idle".to_string());
        spinner.stop(Some("done"));
        assert!(spinner.handle.is_none());
    }
}
