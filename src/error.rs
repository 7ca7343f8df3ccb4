use thiserror::Error;

/// Rejected configuration, reported before a session is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("'{0}' cannot be used as a target character (only A-Z and 0-9)")]
    InvalidChar(char),
    #[error("streak chance must lie within 0.0..=1.0, got {0}")]
    StreakChance(f64),
    #[error("{0} period must be greater than zero")]
    ZeroPeriod(&'static str),
    #[error("miss limit must be greater than zero")]
    ZeroMissLimit,
}
