//! Drives a PIN flow from a terminal or the environment.
//!
//! Interactive sessions read hidden input with `rpassword` and allow a few
//! attempts, pausing briefly after each rejection. Non-interactive sessions
//! (scripts, tests) take the digits from `DREAMLOG_PIN` and get exactly one
//! attempt.

use super::{Gate, GateEvent, GateMode, GateRequest};
use crate::constants::{
    ENV_VAR_DREAMLOG_PIN, MAX_PIN_ATTEMPTS, PIN_ERROR_CLEAR_DELAY_MS, PIN_LENGTH,
};
use crate::errors::{AppError, AppResult};
use crate::storage::Repository;
use std::collections::VecDeque;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Supplies complete PIN inputs.
pub trait PinSource {
    /// Reads one PIN attempt, showing `prompt` when interactive.
    fn read_pin(&mut self, prompt: &str) -> AppResult<Zeroizing<String>>;

    /// Whether a rejected attempt may be retried.
    fn allows_retry(&self) -> bool;
}

/// Hidden terminal input.
pub struct TerminalPins;

impl PinSource for TerminalPins {
    fn read_pin(&mut self, prompt: &str) -> AppResult<Zeroizing<String>> {
        let pin = rpassword::prompt_password(prompt)
            .map_err(|e| AppError::Gate(format!("Failed to read PIN: {}", e)))?;
        Ok(Zeroizing::new(pin))
    }

    fn allows_retry(&self) -> bool {
        true
    }
}

/// A fixed list of inputs, consumed in order. Used for `DREAMLOG_PIN` and tests.
pub struct ScriptedPins {
    pins: VecDeque<Zeroizing<String>>,
    retry: bool,
}

impl ScriptedPins {
    pub fn new<I, S>(pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPins {
            pins: pins.into_iter().map(|p| Zeroizing::new(p.into())).collect(),
            retry: true,
        }
    }

    /// The same value for every prompt of one flow, with no retries.
    pub fn repeated(pin: &str) -> Self {
        ScriptedPins {
            pins: (0..2).map(|_| Zeroizing::new(pin.to_string())).collect(),
            retry: false,
        }
    }
}

impl PinSource for ScriptedPins {
    fn read_pin(&mut self, _prompt: &str) -> AppResult<Zeroizing<String>> {
        self.pins
            .pop_front()
            .ok_or_else(|| AppError::Gate("No more PIN input available".to_string()))
    }

    fn allows_retry(&self) -> bool {
        self.retry
    }
}

/// Picks `DREAMLOG_PIN` when set, else the terminal.
pub fn default_source() -> Box<dyn PinSource> {
    match std::env::var(ENV_VAR_DREAMLOG_PIN) {
        Ok(pin) => {
            debug!("Using {} for non-interactive PIN entry", ENV_VAR_DREAMLOG_PIN);
            Box::new(ScriptedPins::repeated(pin.trim()))
        }
        Err(_) => Box::new(TerminalPins),
    }
}

fn prompt_for(mode: GateMode) -> &'static str {
    match mode {
        GateMode::VerifyStart => "Enter PIN to unlock: ",
        GateMode::DisableVerify => "Enter current PIN to disable the lock: ",
        GateMode::SetNew1 => "Choose a 4-digit PIN: ",
        GateMode::SetNew2 => "Enter the PIN again to confirm: ",
        GateMode::Idle => "PIN: ",
    }
}

/// Feeds one complete input into the gate, returning the final event.
fn submit(gate: &mut Gate, repo: &Repository, pin: &str) -> AppResult<GateEvent> {
    let valid = pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit());
    if !valid {
        return Ok(GateEvent::Rejected);
    }

    let mut event = GateEvent::Pending;
    for digit in pin.chars() {
        event = gate.enter_digit(repo, digit)?;
    }
    Ok(event)
}

/// Runs `request` to completion and returns the terminal event
/// (`Unlocked`, `PinSet` or `PinCleared`).
///
/// # Errors
///
/// - `AppError::Validation` if the request does not fit the stored PIN
/// - `AppError::Gate` when attempts run out or input cannot be read
/// - `AppError::Storage` if the new PIN state could not be saved
pub fn run_flow(
    gate: &mut Gate,
    repo: &Repository,
    source: &mut dyn PinSource,
    request: GateRequest,
) -> AppResult<GateEvent> {
    let stored = repo.load_pin();
    if gate.mode() == GateMode::Idle {
        gate.start(request, stored.as_deref())?;
    }
    if gate.mode() == GateMode::Idle {
        // Nothing to verify: no PIN is stored.
        return Ok(GateEvent::Unlocked);
    }

    let mut failures = 0;
    loop {
        let pin = source.read_pin(prompt_for(gate.mode()))?;
        match submit(gate, repo, pin.as_str())? {
            GateEvent::AwaitConfirmation | GateEvent::Pending => continue,
            GateEvent::Rejected | GateEvent::Mismatch => {
                failures += 1;
                warn!("PIN attempt {} failed", failures);
                if !source.allows_retry() || failures >= MAX_PIN_ATTEMPTS {
                    gate.cancel();
                    return Err(AppError::Gate(match request {
                        GateRequest::Set => "PIN entries did not match".to_string(),
                        _ => "Incorrect PIN".to_string(),
                    }));
                }
                eprintln!("Incorrect, try again.");
                thread::sleep(Duration::from_millis(PIN_ERROR_CLEAR_DELAY_MS));
            }
            done => return Ok(done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SafeStorage};

    fn repo() -> Repository {
        Repository::new(SafeStorage::new(MemoryStore::new()))
    }

    #[test]
    fn test_unlock_without_pin_needs_no_input() {
        let repo = repo();
        let mut gate = Gate::at_launch(None);
        let mut source = ScriptedPins::new(Vec::<String>::new());

        let event = run_flow(&mut gate, &repo, &mut source, GateRequest::Start).unwrap();
        assert_eq!(event, GateEvent::Unlocked);
        assert!(gate.is_unlocked());
    }

    #[test]
    fn test_set_then_unlock() {
        let repo = repo();
        let mut gate = Gate::at_launch(None);
        let mut source = ScriptedPins::repeated("1234");
        let event = run_flow(&mut gate, &repo, &mut source, GateRequest::Set).unwrap();
        assert_eq!(event, GateEvent::PinSet("1234".to_string()));
        assert_eq!(repo.load_pin().as_deref(), Some("1234"));

        let mut gate = Gate::at_launch(repo.load_pin().as_deref());
        let mut source = ScriptedPins::new(["9999", "12", "1234"]);
        let event = run_flow(&mut gate, &repo, &mut source, GateRequest::Start).unwrap();
        assert_eq!(event, GateEvent::Unlocked);
        assert!(gate.is_unlocked());
    }

    #[test]
    fn test_single_attempt_source_fails_fast() {
        let repo = repo();
        repo.save_pin("4321").unwrap();
        let mut gate = Gate::at_launch(Some("4321"));
        let mut source = ScriptedPins::repeated("0000");

        let result = run_flow(&mut gate, &repo, &mut source, GateRequest::Start);
        assert!(matches!(result, Err(AppError::Gate(_))));
        assert!(!gate.is_unlocked());
    }

    #[test]
    fn test_disable_with_wrong_pin_keeps_lock() {
        let repo = repo();
        repo.save_pin("4321").unwrap();
        let mut gate = Gate::default();
        let mut source = ScriptedPins::repeated("1111");

        assert!(run_flow(&mut gate, &repo, &mut source, GateRequest::Disable).is_err());
        assert_eq!(repo.load_pin().as_deref(), Some("4321"));
        assert_eq!(gate.mode(), GateMode::Idle);
    }
}
