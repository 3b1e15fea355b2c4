use thiserror::Error;

/// Which external detector a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorRole {
    Person,
    PrimaryPpe,
    SecondaryPpe,
}

impl std::fmt::Display for DetectorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorRole::Person => f.write_str("person"),
            DetectorRole::PrimaryPpe => f.write_str("primary PPE"),
            DetectorRole::SecondaryPpe => f.write_str("secondary PPE"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("{role} detector failed")]
    Detector {
        role: DetectorRole,
        #[source]
        source: anyhow::Error,
    },

    #[error("{role} detector returned an invalid detection: {reason}")]
    InvalidDetection { role: DetectorRole, reason: String },
}

impl EngineError {
    /// The detector implicated in this error, if any.
    pub fn detector_role(&self) -> Option<DetectorRole> {
        match self {
            EngineError::Detector { role, .. } | EngineError::InvalidDetection { role, .. } => Some(*role),
            _ => None,
        }
    }
}
