pub mod parse;

use std::fmt;

use thiserror::Error;

use crate::noise::NoiseRange;
use crate::row::RelationId;

/// How the engine responds when a monitored row reaches the output boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Perturb the monitored value and let the row through.
    Corrupt,
    /// Terminate with the configured scope.
    Abort(AbortSeverity),
}

/// Scope of an abort response, fixed at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortSeverity {
    Statement,
    Session,
}

impl fmt::Display for AbortSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortSeverity::Statement => write!(f, "statement"),
            AbortSeverity::Session => write!(f, "session"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed target spec: {0}")]
    Parse(String),

    #[error("unknown key '{0}' in target spec")]
    UnknownKey(String),

    #[error("invalid value '{value}' for '{key}'")]
    Value { key: String, value: String },
}

/// Environment variable holding a target spec, e.g.
/// `relation=17&column=2&mode=corrupt`.
pub const TARGET_ENV: &str = "SQLTRAP_TARGET";

/// The monitored (relation, column) pair and the configured response.
/// Built once at startup, immutable afterwards; a partially configured
/// target leaves the engine as a pure pass-through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TamperConfig {
    relation: Option<RelationId>,
    /// 1-based attribute position, 0 = disabled.
    column: u32,
    response: Response,
    noise: NoiseRange,
}

impl Default for TamperConfig {
    fn default() -> Self {
        Self {
            relation: None,
            column: 0,
            response: Response::Corrupt,
            noise: NoiseRange::default(),
        }
    }
}

impl TamperConfig {
    /// Disabled configuration; arm it with the builder setters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relation(mut self, relation: RelationId) -> Self {
        self.relation = Some(relation);
        self
    }

    pub fn column(mut self, position: u32) -> Self {
        self.column = position;
        self
    }

    pub fn response(mut self, response: Response) -> Self {
        self.response = response;
        self
    }

    pub fn noise(mut self, noise: NoiseRange) -> Self {
        self.noise = noise;
        self
    }

    /// Parse a textual target spec, e.g. `relation=17&column=2&mode=abort`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        parse::parse(spec)
    }

    /// Read the target spec from `SQLTRAP_TARGET`, if set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        match std::env::var(TARGET_ENV) {
            Ok(spec) => parse::parse(&spec).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Tampering activates only when both relation and column are set.
    pub fn is_active(&self) -> bool {
        self.relation.is_some() && self.column >= 1
    }

    pub fn matches(&self, relation: RelationId) -> bool {
        self.is_active() && self.relation == Some(relation)
    }

    pub fn monitored_relation(&self) -> Option<RelationId> {
        self.relation
    }

    pub fn monitored_column(&self) -> u32 {
        self.column
    }

    pub fn configured_response(&self) -> Response {
        self.response
    }

    pub fn noise_range(&self) -> NoiseRange {
        self.noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_target_stays_inactive() {
        assert!(!TamperConfig::new().is_active());
        assert!(!TamperConfig::new().relation(RelationId(17)).is_active());
        assert!(!TamperConfig::new().column(2).is_active());

        let armed = TamperConfig::new().relation(RelationId(17)).column(2);
        assert!(armed.is_active());
    }

    #[test]
    fn matches_only_the_configured_relation() {
        let cfg = TamperConfig::new().relation(RelationId(17)).column(2);

        assert!(cfg.matches(RelationId(17)));
        assert!(!cfg.matches(RelationId(42)));

        // A disabled config matches nothing, including its own relation.
        let disabled = TamperConfig::new().relation(RelationId(17));
        assert!(!disabled.matches(RelationId(17)));
    }
}
