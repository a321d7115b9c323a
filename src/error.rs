use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmissionError {
    SessionLimitReached { limit: usize },
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionLimitReached { limit } => {
                write!(f, "session limit of {limit} concurrent players reached")
            }
        }
    }
}

impl std::error::Error for AdmissionError {}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    InvalidWorldSize { width: f64, height: f64 },
    WorldTooSmall { min_side: f64 },
    ZeroTickRate,
    ZeroNameLength,
    ZeroMaxPlayers,
    FoodTargetTooLarge { target: usize, limit: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWorldSize { width, height } => {
                write!(f, "world size must be positive and finite, got {width}x{height}")
            }
            Self::WorldTooSmall { min_side } => {
                write!(f, "world sides must be at least {min_side} to fit the largest player")
            }
            Self::ZeroTickRate => write!(f, "tick rate must be at least 1"),
            Self::ZeroNameLength => write!(f, "max name length must be at least 1"),
            Self::ZeroMaxPlayers => write!(f, "max players must be at least 1"),
            Self::FoodTargetTooLarge { target, limit } => {
                write!(f, "food target {target} exceeds the limit of {limit}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
