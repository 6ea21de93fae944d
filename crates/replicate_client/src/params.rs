//! Sampling parameters forwarded to the inference endpoint.

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Generation sampling knobs. Validated before any request is made:
/// temperature must lie in (0, 5], top_p in (0, 1].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.9,
        }
    }
}

impl GenerationParams {
    pub fn new(temperature: f32, top_p: f32) -> Result<Self> {
        let params = Self { temperature, top_p };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.temperature > 0.0 && self.temperature <= 5.0) {
            return Err(GenerationError::InvalidParams(format!(
                "temperature {} outside (0, 5]",
                self.temperature
            )));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(GenerationError::InvalidParams(format!(
                "top_p {} outside (0, 1]",
                self.top_p
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GenerationParams::default().validate().is_ok());
    }

    #[test]
    fn range_bounds() {
        assert!(GenerationParams::new(5.0, 1.0).is_ok());
        assert!(GenerationParams::new(0.01, 0.01).is_ok());

        assert!(GenerationParams::new(0.0, 0.9).is_err());
        assert!(GenerationParams::new(5.1, 0.9).is_err());
        assert!(GenerationParams::new(0.3, 0.0).is_err());
        assert!(GenerationParams::new(0.3, 1.1).is_err());
    }

    #[test]
    fn nan_is_rejected() {
        assert!(GenerationParams::new(f32::NAN, 0.9).is_err());
        assert!(GenerationParams::new(0.3, f32::NAN).is_err());
    }
}
