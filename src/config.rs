//! Process configuration surface.
//!
//! Session timeout and connection-pool size are collaborator configuration
//! and are not modeled here — this crate's only configuration knob is the
//! mining difficulty.

const DEFAULT_DIFFICULTY: u32 = 4;
const DIFFICULTY_ENV_VAR: &str = "BLOCKCHAIN_DIFFICULTY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub difficulty: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl Config {
    /// Reads `BLOCKCHAIN_DIFFICULTY` from the environment, falling back to
    /// the default (and logging why) on a missing or unparsable value.
    pub fn from_env() -> Self {
        match std::env::var(DIFFICULTY_ENV_VAR) {
            Ok(raw) => match raw.parse::<u32>() {
                Ok(difficulty) => Self { difficulty },
                Err(_) => {
                    tracing::warn!(
                        value = %raw,
                        "BLOCKCHAIN_DIFFICULTY is not a valid non-negative integer, using default"
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
