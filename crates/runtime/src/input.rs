//! Latest pointer and audio input, recorded between frames.
//!
//! Input handlers only write here; the controller reads the state once per
//! tick to build that step's excitations.

use glam::DVec2;

/// Number of low-frequency analyser bins averaged into the bass level.
pub const AUDIO_BASS_BINS: usize = 10;

/// Bass intensity in [0, 1]: mean of the first [`AUDIO_BASS_BINS`] byte bins
/// of an analyser spectrum, divided by 255. An empty spectrum is silent.
pub fn bass_intensity(spectrum: &[u8]) -> f64 {
    let bins = &spectrum[..spectrum.len().min(AUDIO_BASS_BINS)];
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&b| u32::from(b)).sum();
    sum as f64 / bins.len() as f64 / 255.0
}

/// Pointer and audio state as last reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pointer: Option<DVec2>,
    armed: bool,
    audio_level: Option<f64>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pointer move in viewport pixels. Moving arms the ring.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let Some(p) = finite_point(x, y) {
            self.pointer = Some(p);
            self.armed = true;
        }
    }

    /// Records a press at a viewport position.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.pointer_move(x, y);
    }

    /// Records a release; no ring is injected until the pointer moves again.
    pub fn pointer_up(&mut self) {
        self.armed = false;
    }

    /// Latest pointer position in viewport pixels.
    pub fn pointer(&self) -> Option<DVec2> {
        self.pointer
    }

    /// Whether the next step should inject a pointer ring.
    pub fn is_armed(&self) -> bool {
        self.armed && self.pointer.is_some()
    }

    /// Records an audio level, clamped to [0, 1]. Non-finite levels clear it.
    pub fn set_audio_level(&mut self, level: f64) {
        self.audio_level = level.is_finite().then(|| level.clamp(0.0, 1.0));
    }

    /// Records the bass level of an analyser spectrum.
    pub fn set_audio_spectrum(&mut self, spectrum: &[u8]) {
        self.set_audio_level(bass_intensity(spectrum));
    }

    /// Forgets the audio level, e.g. when capture permission is revoked.
    pub fn clear_audio(&mut self) {
        self.audio_level = None;
    }

    pub fn audio_level(&self) -> Option<f64> {
        self.audio_level
    }
}

fn finite_point(x: f64, y: f64) -> Option<DVec2> {
    let p = DVec2::new(x, y);
    p.is_finite().then_some(p)
}
