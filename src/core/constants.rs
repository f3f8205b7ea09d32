//! Shared constants used across the application

/// Model used when neither the command line nor the config names one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Pause between probe attempts so a free-tier key is not rate limited.
pub const DEFAULT_PROBE_DELAY_MS: u64 = 1000;

/// Prompt sent to each candidate when probing models.
pub const PROBE_PROMPT: &str = "Hi";
