//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers from the display layout live here with:
//! - Units (pixels, bars, seconds)
//! - Documented ranges and meanings
//! - Validation before a session starts

use crate::error::VisError;

/// Waveform analysis parameters
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Number of envelope bars computed across the whole track.
    /// Each bar covers 1/bars of the track's sample frames.
    pub bars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { bars: 1024 }
    }
}

impl AnalysisConfig {
    /// Validate configuration (bar count must be positive)
    pub fn validate(&self) -> Result<(), VisError> {
        if self.bars == 0 {
            return Err(VisError::InvalidConfig(
                "envelope bar count must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Drawn width of one bar (pixels)
    pub bar_width_px: u32,

    /// Horizontal distance between bar slots (pixels)
    pub bar_pitch_px: u32,

    /// Pixels of bar half-height per unit of amplitude.
    /// An amplitude of 1.0 spans `2 * height_scale` pixels about the
    /// vertical center.
    pub height_scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            bar_width_px: 3,
            bar_pitch_px: 5,
            height_scale: 100.0,
        }
    }
}

impl RenderConfig {
    /// Scroll buffer capacity derived from display geometry:
    /// the visible strip width divided by the per-bar pitch.
    pub fn scroll_capacity(&self) -> usize {
        ((self.window_width - self.window_height / 3) / self.bar_pitch_px) as usize
    }

    /// Validate configuration (non-zero geometry)
    pub fn validate(&self) -> Result<(), VisError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(VisError::InvalidConfig(
                "window dimensions must be > 0".to_string(),
            ));
        }
        if self.bar_pitch_px == 0 {
            return Err(VisError::InvalidConfig(
                "bar pitch must be > 0".to_string(),
            ));
        }
        if self.bar_width_px > self.bar_pitch_px {
            return Err(VisError::InvalidConfig(format!(
                "bar width {} exceeds bar pitch {}",
                self.bar_width_px, self.bar_pitch_px
            )));
        }
        if self.window_height / 3 >= self.window_width {
            return Err(VisError::InvalidConfig(
                "window too narrow for the visible strip".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_capacity_default_geometry() {
        // (1280 - 720/3) / 5 = 1040 / 5
        let config = RenderConfig::default();
        assert_eq!(config.scroll_capacity(), 208);
    }

    #[test]
    fn test_analysis_config_rejects_zero_bars() {
        let config = AnalysisConfig { bars: 0 };
        assert!(config.validate().is_err());
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_render_config_rejects_zero_pitch() {
        let config = RenderConfig {
            bar_pitch_px: 0,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_render_config_rejects_bar_wider_than_pitch() {
        let config = RenderConfig {
            bar_width_px: 6,
            bar_pitch_px: 5,
            ..RenderConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
