//! New-version check
//!
//! One GET to the update endpoint with the running version; the reply body
//! is a boolean. Any failure means "no update".

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::UpdateError;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Parse a boolean the way the endpoint writes one
pub fn parse_update_flag(body: &str) -> Result<bool, UpdateError> {
    match body.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(UpdateError::Parse(other.to_string())),
    }
}

fn fetch(endpoint: &str, version: &str) -> Result<bool, UpdateError> {
    let client = Client::builder()
        .timeout(TIMEOUT)
        .user_agent(concat!("feeder/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let body = client
        .get(endpoint)
        .query(&[("V", version)])
        .send()?
        .error_for_status()?
        .text()?;
    parse_update_flag(&body)
}

/// Ask `endpoint` whether a version newer than `version` exists
pub fn check_for_update(endpoint: &str, version: &str) -> bool {
    match fetch(endpoint, version) {
        Ok(available) => {
            log::info!("Update check: {}", if available { "update available" } else { "up to date" });
            available
        }
        Err(e) => {
            log::info!("Update check skipped: {e}");
            false
        }
    }
}

/// A check running in the background
#[derive(Debug)]
pub struct UpdateCheck {
    rx: Option<Receiver<bool>>,
    available: bool,
}

impl UpdateCheck {
    pub fn spawn(endpoint: String, version: &'static str) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(check_for_update(&endpoint, version));
        });
        Self {
            rx: Some(rx),
            available: false,
        }
    }

    /// A check that already answered "no"
    pub fn disabled() -> Self {
        Self {
            rx: None,
            available: false,
        }
    }

    /// Whether an update is known to be available; false until the check answers
    pub fn poll(&mut self) -> bool {
        if let Some(rx) = &self.rx {
            match rx.try_recv() {
                Ok(available) => {
                    self.available = available;
                    self.rx = None;
                }
                Err(TryRecvError::Disconnected) => self.rx = None,
                Err(TryRecvError::Empty) => {}
            }
        }
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_boolean_spellings() {
        for body in ["1", "t", "T", "TRUE", "true", "True", " true\n"] {
            assert!(parse_update_flag(body).unwrap(), "{body:?}");
        }
        for body in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!parse_update_flag(body).unwrap(), "{body:?}");
        }
    }

    #[test]
    fn test_parse_rejects_other_bodies() {
        for body in ["", "yes", "tRuE", "{\"update\":true}"] {
            assert!(parse_update_flag(body).is_err(), "{body:?}");
        }
    }

    #[test]
    fn test_unreachable_endpoint_means_no_update() {
        // Nothing listens on port 9 of the loopback address
        assert!(!check_for_update("http://127.0.0.1:9/UpdateAvailable", "1.0"));
    }

    #[test]
    fn test_disabled_check_never_reports() {
        let mut check = UpdateCheck::disabled();
        assert!(!check.poll());
    }
}
