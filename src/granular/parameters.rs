use crate::Error;

// -------------------------------------------------------------------------------------------------

/// Selects which player renders the wet signal of a [`GranularProcessor`](super::GranularProcessor).
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::VariantNames,
)]
#[repr(u8)]
pub enum PlaybackMode {
    /// Polyphonic granular cloud of windowed buffer snippets.
    #[default]
    Granular,
    /// A tape style delay with smoothed position slewing and filter sweeps.
    LoopingDelay,
    /// A granular cloud regenerating one octave up for shimmer washes.
    Shimmer,
}

// -------------------------------------------------------------------------------------------------

/// All performance parameters of a [`GranularProcessor`](super::GranularProcessor), as one plain
/// value snapshot.
///
/// Snapshots are `Copy` and get handed to the audio thread as a whole through a lock-free queue,
/// so a control thread never partially updates a parameter set mid-block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GranularParameters {
    /// Playback mode of the wet signal.
    pub mode: PlaybackMode,
    /// Normalized read position in the buffered past: 0 is now, 1 the oldest buffered audio.
    pub position: f32,
    /// Grain length or loop length, normalized in range [0, 1].
    pub size: f32,
    /// Playback pitch in semitones, in range [-24, 24].
    pub pitch: f32,
    /// Grain spawn density, normalized in range [0, 1].
    pub density: f32,
    /// Spawn randomization and diffusion amount, normalized in range [0, 1]. Above 0.75 the
    /// output additionally runs through the allpass diffuser.
    pub texture: f32,
    /// Dry/wet mix in range [0, 1].
    pub dry_wet: f32,
    /// Feedback amount of wet output back into the record head, in range [0, 1].
    pub feedback: f32,
    /// Stops recording and plays the buffered audio indefinitely.
    pub freeze: bool,
}

impl Default for GranularParameters {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::default(),
            position: 0.5,
            size: 0.5,
            pitch: 0.0,
            density: 0.5,
            texture: 0.5,
            dry_wet: 0.5,
            feedback: 0.0,
            freeze: false,
        }
    }
}

impl GranularParameters {
    /// Return a copy with all values clamped into their valid ranges.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            mode: self.mode,
            position: self.position.clamp(0.0, 1.0),
            size: self.size.clamp(0.0, 1.0),
            pitch: self.pitch.clamp(-24.0, 24.0),
            density: self.density.clamp(0.0, 1.0),
            texture: self.texture.clamp(0.0, 1.0),
            dry_wet: self.dry_wet.clamp(0.0, 1.0),
            feedback: self.feedback.clamp(0.0, 1.0),
            freeze: self.freeze,
        }
    }

    /// Validate all parameter ranges, returning a descriptive error for the first violation.
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.position) {
            return Err(Error::ParameterError(format!(
                "Granular position must be in range [0, 1] but is '{}'",
                self.position
            )));
        }
        if !(0.0..=1.0).contains(&self.size) {
            return Err(Error::ParameterError(format!(
                "Granular size must be in range [0, 1] but is '{}'",
                self.size
            )));
        }
        if !(-24.0..=24.0).contains(&self.pitch) {
            return Err(Error::ParameterError(format!(
                "Granular pitch must be in range [-24, 24] semitones but is '{}'",
                self.pitch
            )));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(Error::ParameterError(format!(
                "Granular density must be in range [0, 1] but is '{}'",
                self.density
            )));
        }
        if !(0.0..=1.0).contains(&self.texture) {
            return Err(Error::ParameterError(format!(
                "Granular texture must be in range [0, 1] but is '{}'",
                self.texture
            )));
        }
        if !(0.0..=1.0).contains(&self.dry_wet) {
            return Err(Error::ParameterError(format!(
                "Granular dry/wet must be in range [0, 1] but is '{}'",
                self.dry_wet
            )));
        }
        if !(0.0..=1.0).contains(&self.feedback) {
            return Err(Error::ParameterError(format!(
                "Granular feedback must be in range [0, 1] but is '{}'",
                self.feedback
            )));
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
