//! Cosmetic animation state driven by the animation tick

/// Frames in one pulse cycle
const PHASE_FRAMES: usize = 12;

/// Flash intensity lost per tick
const FLASH_DECAY: f32 = 0.125;

const PULSE_GLYPHS: [&str; 4] = ["·", "•", "●", "•"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationState {
    phase: usize,
    flash: f32,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the pulse phase and decay any active flash
    pub fn tick(&mut self) {
        self.phase = (self.phase + 1) % PHASE_FRAMES;
        self.flash = (self.flash - FLASH_DECAY).max(0.0);
    }

    /// Start a "selection confirmed" flash at full intensity
    pub fn flash(&mut self) {
        self.flash = 1.0;
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Flash intensity in `[0, 1]`
    pub fn flash_level(&self) -> f32 {
        self.flash
    }

    pub fn is_flashing(&self) -> bool {
        self.flash > 0.0
    }

    /// Marker drawn next to running sessions
    pub fn pulse_glyph(&self) -> &'static str {
        PULSE_GLYPHS[self.phase * PULSE_GLYPHS.len() / PHASE_FRAMES]
    }
}
