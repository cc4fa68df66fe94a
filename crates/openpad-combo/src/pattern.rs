//! Combo pattern definition.

use openpad_device_types::ComboToken;
use openpad_errors::{PadError, Result};
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_TIMEOUT_MS, MAX_TIMEOUT_MS, MAX_TOKENS};

/// Identifier assigned at registration; unique for the detector's lifetime,
/// never reused after unregistration.
pub type ComboId = u32;

/// An ordered button sequence with a timeout.
///
/// The token sequence is immutable once registered; only `enabled` may
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboPattern {
    name: String,
    tokens: Vec<ComboToken>,
    timeout_ms: u32,
    enabled: bool,
}

impl ComboPattern {
    /// Build a pattern from a token sequence.
    ///
    /// A `timeout_ms` of 0 or above [`MAX_TIMEOUT_MS`] falls back to
    /// [`DEFAULT_TIMEOUT_MS`].
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty name, an empty sequence, or more than
    /// [`MAX_TOKENS`] tokens.
    pub fn new(
        name: impl Into<String>,
        tokens: impl Into<Vec<ComboToken>>,
        timeout_ms: u32,
    ) -> Result<Self> {
        let name = name.into();
        let tokens = tokens.into();
        if name.is_empty() {
            return Err(PadError::invalid("name", &name, "non-empty"));
        }
        if tokens.is_empty() || tokens.len() > MAX_TOKENS {
            return Err(PadError::out_of_range(
                "token count",
                tokens.len(),
                1,
                MAX_TOKENS,
            ));
        }
        let timeout_ms = if timeout_ms == 0 || timeout_ms > MAX_TIMEOUT_MS {
            DEFAULT_TIMEOUT_MS
        } else {
            timeout_ms
        };
        Ok(Self {
            name,
            tokens,
            timeout_ms,
            enabled: true,
        })
    }

    /// Pattern name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The token sequence.
    pub fn tokens(&self) -> &[ComboToken] {
        &self.tokens
    }

    /// Timeout between first press and completion.
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Whether the pattern participates in matching.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Constructor for statically-valid stock patterns.
    pub(crate) fn preset(name: &'static str, tokens: Vec<ComboToken>, timeout_ms: u32) -> Self {
        Self {
            name: name.to_string(),
            tokens,
            timeout_ms,
            enabled: true,
        }
    }

    pub(crate) fn rebuild(
        name: String,
        tokens: Vec<ComboToken>,
        timeout_ms: u32,
        enabled: bool,
    ) -> Result<Self> {
        let mut pattern = Self::new(name, tokens, timeout_ms)?;
        pattern.enabled = enabled;
        Ok(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openpad_device_types::PadButton;

    fn tokens(buttons: &[PadButton]) -> Vec<ComboToken> {
        buttons.iter().copied().map(ComboToken::Button).collect()
    }

    #[test]
    fn test_new_pattern() -> Result<()> {
        let pattern = ComboPattern::new("Dash", tokens(&[PadButton::B, PadButton::B]), 800)?;
        assert_eq!(pattern.name(), "Dash");
        assert_eq!(pattern.tokens().len(), 2);
        assert_eq!(pattern.timeout_ms(), 800);
        assert!(pattern.is_enabled());
        Ok(())
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() -> Result<()> {
        let pattern = ComboPattern::new("P", tokens(&[PadButton::A]), 0)?;
        assert_eq!(pattern.timeout_ms(), DEFAULT_TIMEOUT_MS);
        Ok(())
    }

    #[test]
    fn test_oversized_timeout_falls_back_to_default() -> Result<()> {
        let pattern = ComboPattern::new("P", tokens(&[PadButton::A]), MAX_TIMEOUT_MS + 1)?;
        assert_eq!(pattern.timeout_ms(), DEFAULT_TIMEOUT_MS);
        Ok(())
    }

    #[test]
    fn test_max_timeout_is_accepted() -> Result<()> {
        let pattern = ComboPattern::new("P", tokens(&[PadButton::A]), MAX_TIMEOUT_MS)?;
        assert_eq!(pattern.timeout_ms(), MAX_TIMEOUT_MS);
        Ok(())
    }

    #[test]
    fn test_empty_sequence_rejected() {
        assert!(ComboPattern::new("P", Vec::new(), 1000).is_err());
    }

    #[test]
    fn test_oversized_sequence_rejected() {
        let too_many = tokens(&[PadButton::A; 9]);
        assert!(ComboPattern::new("P", too_many, 1000).is_err());
    }

    #[test]
    fn test_eight_tokens_accepted() {
        let eight = tokens(&[PadButton::A; 8]);
        assert!(ComboPattern::new("P", eight, 1000).is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(ComboPattern::new("", tokens(&[PadButton::A]), 1000).is_err());
    }

    #[test]
    fn test_serde_round_trip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let pattern = ComboPattern::new(
            "Wild",
            vec![ComboToken::Any, ComboToken::Button(PadButton::Start)],
            1500,
        )?;
        let json = serde_json::to_string(&pattern)?;
        let back: ComboPattern = serde_json::from_str(&json)?;
        assert_eq!(pattern, back);
        Ok(())
    }
}
