// ABOUTME: Input screening and output sanitization for untrusted payloads.
// ABOUTME: Pattern-based rejection before dispatch, secret redaction after.

use regex::Regex;

/// Default ceiling on accepted input size, in bytes.
pub const DEFAULT_MAX_INPUT_LEN: usize = 10_000;

/// Screens task input before dispatch and scrubs worker output after.
///
/// Validation is a deliberate gate for untrusted edges: attach a validator
/// to the dispatcher only where input arrives from outside the process.
/// The built-in patterns reject credential material and code-execution
/// primitives; `block` adds caller-specific patterns on top.
pub struct InputValidator {
    blocked: Vec<Regex>,
    redact: Regex,
    max_len: usize,
}

impl InputValidator {
    /// Create a validator with the built-in patterns and default size cap.
    pub fn new() -> Self {
        let blocked = [
            r"(?i)(api_key|password|secret)",
            r"(?i)(eval|exec|__import__)",
            r"(?i)(system|popen|subprocess)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("built-in pattern compiles"))
        .collect();

        Self {
            blocked,
            redact: Regex::new(r"(sk-|api_key=)[a-zA-Z0-9]+").expect("built-in pattern compiles"),
            max_len: DEFAULT_MAX_INPUT_LEN,
        }
    }

    /// Override the input size cap.
    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Add a blocked pattern on top of the built-ins.
    pub fn block(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.blocked.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Check an input payload, returning the rejection reason if any.
    pub fn validate(&self, input: &str) -> Result<(), String> {
        for pattern in &self.blocked {
            if pattern.is_match(input) {
                return Err(format!("input matches blocked pattern '{}'", pattern));
            }
        }
        if input.len() > self.max_len {
            return Err(format!(
                "input of {} bytes exceeds the {} byte limit",
                input.len(),
                self.max_len
            ));
        }
        Ok(())
    }

    /// Redact secret-shaped spans from worker output.
    pub fn sanitize(&self, output: &str) -> String {
        self.redact.replace_all(output, "[REDACTED]").into_owned()
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}
