use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use four_cc::FourCC;

use super::{
    buffer::AudioBuffer,
    diffuser::Diffuser,
    looper::LoopingPlayer,
    parameters::{GranularParameters, PlaybackMode},
    pitch_shifter::PitchShifter,
    player::{GranularPlayer, ShimmerPlayer},
};
use crate::{
    parameter::{
        BooleanParameter, BooleanParameterValue, EnumParameter, EnumParameterValue,
        FloatParameter, ParameterValueUpdate, SmoothedParameterValue,
    },
    unit::AudioUnit,
    utils::{
        buffer::{interleaved_to_planar, planar_to_interleaved},
        dsp::{semitones_to_ratio, smoothstep, soft_clip},
        filter::{OnePoleFilter, SvfFilter},
        smoothed::ExponentialSmoothedValue,
    },
    ClonableParameter, Error,
};

// -------------------------------------------------------------------------------------------------

/// Audio history kept for granular playback, in seconds.
const BUFFER_SECONDS: f32 = 4.0;

/// Largest slice processed at once. Longer host blocks get split internally.
const MAX_CHUNK_FRAMES: usize = 2048;

/// Length of the V-shaped mode crossfade in samples: fade out the old player over the first
/// half, swap at the midpoint, fade in the new player over the second half.
const CROSSFADE_FRAMES: usize = 512;

/// Capacity of the lock-free parameter snapshot queue.
const PARAMETER_QUEUE_SIZE: usize = 16;

/// Per block smoothing factor of the freeze gain ramp.
const FREEZE_LP_COEFF: f32 = 0.05;

/// Smoothing inertia of the per block granular parameters.
const PARAMETER_INERTIA: f32 = 0.15;
/// Smoothing inertia of the per frame dry/wet ramp.
const DRY_WET_INERTIA: f32 = 0.005;

// -------------------------------------------------------------------------------------------------

/// Granular texture processor: records its input into circular buffers and plays them back
/// through one of three wet players, with pitch shifting, diffusion, a soft clipped feedback
/// path and freeze.
///
/// All processing runs on a single audio thread. Parameter changes arrive either through the
/// plain setters, or lock-free from other threads as whole [`GranularParameters`] snapshots via
/// [`Self::parameter_sender`]. Mode switches crossfade over [`CROSSFADE_FRAMES`] samples, so
/// players can be swapped without clicks while audio keeps running.
#[derive(Debug)]
pub struct GranularProcessor {
    channel_count: usize,
    sample_rate: u32,

    buffers: Vec<AudioBuffer>,
    granular: GranularPlayer,
    shimmer: ShimmerPlayer,
    looper: LoopingPlayer,
    pitch_shifter: PitchShifter,
    diffuser: Diffuser,

    mode: EnumParameterValue<PlaybackMode>,
    position: SmoothedParameterValue,
    size: SmoothedParameterValue,
    pitch: SmoothedParameterValue,
    density: SmoothedParameterValue,
    texture: SmoothedParameterValue,
    dry_wet: SmoothedParameterValue,
    feedback: SmoothedParameterValue,
    freeze: BooleanParameterValue,

    current_mode: PlaybackMode,
    crossfade_remaining: usize,

    bypass: bool,
    silence: bool,

    frozen: bool,
    freeze_lp: OnePoleFilter,

    fb_filters: [SvfFilter; 2],
    post_lowpass: [SvfFilter; 2],
    post_highpass: [SvfFilter; 2],

    dry_scratch: [Vec<f32>; 2],
    write_scratch: [Vec<f32>; 2],
    fb_scratch: [Vec<f32>; 2],
    fb_frames: usize,

    parameter_queue: Arc<ArrayQueue<GranularParameters>>,
}

impl GranularProcessor {
    /// Create a new processor for the given sample rate and channel count (1 or 2).
    pub fn new(sample_rate: u32, channel_count: usize) -> Result<Self, Error> {
        if sample_rate == 0 {
            return Err(Error::ParameterError(
                "Sample rate must not be zero".to_string(),
            ));
        }
        if !(1..=2).contains(&channel_count) {
            return Err(Error::ChannelCountError(channel_count));
        }

        let buffer_size = (sample_rate as f32 * BUFFER_SECONDS) as usize;
        let buffers = (0..channel_count)
            .map(|_| AudioBuffer::new(buffer_size))
            .collect();

        let defaults = GranularParameters::default();
        let mut processor = Self {
            channel_count,
            sample_rate,
            buffers,
            granular: GranularPlayer::new(sample_rate),
            shimmer: ShimmerPlayer::new(sample_rate),
            looper: LoopingPlayer::new(sample_rate),
            pitch_shifter: PitchShifter::new(),
            diffuser: Diffuser::new(),
            mode: EnumParameterValue::new(EnumParameter::new(
                GranularProcessorUnit::MODE_ID,
                "Mode",
                defaults.mode,
            )),
            position: Self::smoothed_parameter(
                FloatParameter::new(
                    GranularProcessorUnit::POSITION_ID,
                    "Position",
                    0.0..=1.0,
                    defaults.position,
                ),
                PARAMETER_INERTIA,
                sample_rate,
            ),
            size: Self::smoothed_parameter(
                FloatParameter::new(
                    GranularProcessorUnit::SIZE_ID,
                    "Size",
                    0.0..=1.0,
                    defaults.size,
                ),
                PARAMETER_INERTIA,
                sample_rate,
            ),
            pitch: Self::smoothed_parameter(
                FloatParameter::new(
                    GranularProcessorUnit::PITCH_ID,
                    "Pitch",
                    -24.0..=24.0,
                    defaults.pitch,
                )
                .with_unit("st"),
                PARAMETER_INERTIA,
                sample_rate,
            ),
            density: Self::smoothed_parameter(
                FloatParameter::new(
                    GranularProcessorUnit::DENSITY_ID,
                    "Density",
                    0.0..=1.0,
                    defaults.density,
                ),
                PARAMETER_INERTIA,
                sample_rate,
            ),
            texture: Self::smoothed_parameter(
                FloatParameter::new(
                    GranularProcessorUnit::TEXTURE_ID,
                    "Texture",
                    0.0..=1.0,
                    defaults.texture,
                ),
                PARAMETER_INERTIA,
                sample_rate,
            ),
            dry_wet: Self::smoothed_parameter(
                FloatParameter::new(
                    GranularProcessorUnit::DRY_WET_ID,
                    "Dry/Wet",
                    0.0..=1.0,
                    defaults.dry_wet,
                ),
                DRY_WET_INERTIA,
                sample_rate,
            ),
            feedback: Self::smoothed_parameter(
                FloatParameter::new(
                    GranularProcessorUnit::FEEDBACK_ID,
                    "Feedback",
                    0.0..=1.0,
                    defaults.feedback,
                ),
                PARAMETER_INERTIA,
                sample_rate,
            ),
            freeze: BooleanParameterValue::new(BooleanParameter::new(
                GranularProcessorUnit::FREEZE_ID,
                "Freeze",
                defaults.freeze,
            )),
            current_mode: defaults.mode,
            crossfade_remaining: 0,
            bypass: false,
            silence: false,
            frozen: defaults.freeze,
            freeze_lp: OnePoleFilter::new(),
            fb_filters: [SvfFilter::default(), SvfFilter::default()],
            post_lowpass: [SvfFilter::default(), SvfFilter::default()],
            post_highpass: [SvfFilter::default(), SvfFilter::default()],
            dry_scratch: [vec![0.0; MAX_CHUNK_FRAMES], vec![0.0; MAX_CHUNK_FRAMES]],
            write_scratch: [vec![0.0; MAX_CHUNK_FRAMES], vec![0.0; MAX_CHUNK_FRAMES]],
            fb_scratch: [vec![0.0; MAX_CHUNK_FRAMES], vec![0.0; MAX_CHUNK_FRAMES]],
            fb_frames: 0,
            parameter_queue: Arc::new(ArrayQueue::new(PARAMETER_QUEUE_SIZE)),
        };
        processor.reset();
        Ok(processor)
    }

    fn smoothed_parameter(
        description: FloatParameter,
        inertia: f32,
        sample_rate: u32,
    ) -> SmoothedParameterValue {
        SmoothedParameterValue::new(
            description,
            ExponentialSmoothedValue::with_inertia(0.0, inertia, sample_rate),
        )
    }

    /// The processor's channel count, as passed at construction.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// The processor's sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The current parameter targets as one plain snapshot.
    pub fn parameters(&self) -> GranularParameters {
        GranularParameters {
            mode: *self.mode.value(),
            position: self.position.target_value(),
            size: self.size.target_value(),
            pitch: self.pitch.target_value(),
            density: self.density.target_value(),
            texture: self.texture.target_value(),
            dry_wet: self.dry_wet.target_value(),
            feedback: self.feedback.target_value(),
            freeze: self.freeze.value(),
        }
    }

    /// Validate and apply a whole parameter snapshot.
    pub fn set_parameters(&mut self, parameters: &GranularParameters) -> Result<(), Error> {
        parameters.validate()?;
        self.apply_parameters(parameters);
        Ok(())
    }

    /// A cloneable, lock-free sender to schedule parameter snapshots from other threads.
    /// Snapshots get applied at the start of the next processed block.
    pub fn parameter_sender(&self) -> GranularParameterSender {
        GranularParameterSender {
            queue: Arc::clone(&self.parameter_queue),
        }
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode.set_value(mode);
    }
    pub fn set_position(&mut self, position: f32) {
        self.position.set_target_clamped(position);
    }
    pub fn set_size(&mut self, size: f32) {
        self.size.set_target_clamped(size);
    }
    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch.set_target_clamped(pitch);
    }
    pub fn set_density(&mut self, density: f32) {
        self.density.set_target_clamped(density);
    }
    pub fn set_texture(&mut self, texture: f32) {
        self.texture.set_target_clamped(texture);
    }
    pub fn set_dry_wet(&mut self, dry_wet: f32) {
        self.dry_wet.set_target_clamped(dry_wet);
    }
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback.set_target_clamped(feedback);
    }
    pub fn set_freeze(&mut self, freeze: bool) {
        self.freeze.set_value(freeze);
    }

    /// When set, `process` copies the input straight to the output, skipping all processing.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    /// When set, `process` writes silence, skipping all processing.
    pub fn set_silence(&mut self, silence: bool) {
        self.silence = silence;
    }

    /// Reconfigure for a new sample rate, reallocating buffers but keeping parameter targets.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), Error> {
        if sample_rate != self.sample_rate {
            let parameters = self.parameters();
            let queue = Arc::clone(&self.parameter_queue);
            *self = Self::new(sample_rate, self.channel_count)?;
            self.parameter_queue = queue;
            self.set_parameters(&parameters)?;
        }
        Ok(())
    }

    /// Clear all buffered audio and player state, keeping the current parameter targets.
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.clear();
        }
        self.granular.reset();
        self.shimmer.reset();
        self.looper.reset();
        self.pitch_shifter.reset();
        self.diffuser.reset();
        for filter in self
            .fb_filters
            .iter_mut()
            .chain(self.post_lowpass.iter_mut())
            .chain(self.post_highpass.iter_mut())
        {
            filter.reset();
        }
        self.freeze_lp.reset();
        self.current_mode = *self.mode.value();
        self.crossfade_remaining = 0;
        self.frozen = self.freeze.value();
        for scratch in &mut self.fb_scratch {
            scratch.fill(0.0);
        }
        self.fb_frames = 0;
    }

    /// Process one block of planar audio.
    ///
    /// All four slices must have the same length; extra samples beyond the shortest slice are
    /// left untouched. With a mono processor, pass the mono input for both input slices (they
    /// may alias) and a scratch slice for the right output, which receives a copy of the left
    /// channel.
    pub fn process(
        &mut self,
        input_left: &[f32],
        input_right: &[f32],
        output_left: &mut [f32],
        output_right: &mut [f32],
    ) {
        let frames = input_left
            .len()
            .min(input_right.len())
            .min(output_left.len())
            .min(output_right.len());

        if self.bypass {
            output_left[..frames].copy_from_slice(&input_left[..frames]);
            output_right[..frames].copy_from_slice(&input_right[..frames]);
            return;
        }
        if self.silence {
            output_left[..frames].fill(0.0);
            output_right[..frames].fill(0.0);
            return;
        }

        // apply the most recent pending parameter snapshot, if any
        let mut pending = None;
        while let Some(parameters) = self.parameter_queue.pop() {
            pending = Some(parameters);
        }
        if let Some(parameters) = &pending {
            self.apply_parameters(parameters);
        }

        let mut offset = 0;
        while offset < frames {
            if self.crossfade_remaining == 0 && *self.mode.value() != self.current_mode {
                self.crossfade_remaining = CROSSFADE_FRAMES;
            }
            let mut chunk = (frames - offset).min(MAX_CHUNK_FRAMES);
            if self.crossfade_remaining > CROSSFADE_FRAMES / 2 {
                // stop at the crossfade midpoint so the player swap lands between chunks
                chunk = chunk.min(self.crossfade_remaining - CROSSFADE_FRAMES / 2);
            }
            let range = offset..offset + chunk;
            self.process_chunk(
                &input_left[range.clone()],
                &input_right[range.clone()],
                &mut output_left[range.clone()],
                &mut output_right[range],
            );
            offset += chunk;
        }
    }

    fn apply_parameters(&mut self, parameters: &GranularParameters) {
        self.mode.set_value(parameters.mode);
        self.position.set_target_clamped(parameters.position);
        self.size.set_target_clamped(parameters.size);
        self.pitch.set_target_clamped(parameters.pitch);
        self.density.set_target_clamped(parameters.density);
        self.texture.set_target_clamped(parameters.texture);
        self.dry_wet.set_target_clamped(parameters.dry_wet);
        self.feedback.set_target_clamped(parameters.feedback);
        self.freeze.set_value(parameters.freeze);
    }

    fn reset_player(&mut self, mode: PlaybackMode) {
        match mode {
            PlaybackMode::Granular => self.granular.reset(),
            PlaybackMode::LoopingDelay => {
                self.looper.reset();
                self.pitch_shifter.reset();
            }
            PlaybackMode::Shimmer => self.shimmer.reset(),
        }
    }

    fn process_chunk(
        &mut self,
        input_left: &[f32],
        input_right: &[f32],
        output_left: &mut [f32],
        output_right: &mut [f32],
    ) {
        let frames = input_left.len();
        let freeze = self.freeze.value();
        let stereo = self.channel_count == 2;

        // mode transitions swap the active player at the crossfade midpoint, which the chunking
        // in `process` guarantees to land on a chunk boundary
        if self.crossfade_remaining == CROSSFADE_FRAMES / 2 {
            self.current_mode = *self.mode.value();
            self.reset_player(self.current_mode);
        }

        // advance the per block parameter smoothers
        let resolved = GranularParameters {
            mode: self.current_mode,
            position: self.position.next_value(),
            size: self.size.next_value(),
            pitch: self.pitch.next_value(),
            density: self.density.next_value(),
            texture: self.texture.next_value(),
            dry_wet: self.dry_wet.target_value(),
            feedback: self.feedback.next_value(),
            freeze,
        };

        // keep the dry signal for the final mix before anything touches the outputs
        self.dry_scratch[0][..frames].copy_from_slice(input_left);
        self.dry_scratch[1][..frames].copy_from_slice(input_right);

        // freeze gain ramps slowly to avoid feedback level jumps when toggling freeze
        let freeze_gain = self
            .freeze_lp
            .process(if freeze { 1.0 } else { 0.0 }, FREEZE_LP_COEFF);

        // mix the previous block's wet output into the recorded signal
        let fb_amount = resolved.feedback;
        let fb_gain = fb_amount * (1.0 - freeze_gain);
        let fb_cutoff = (20.0 + 100.0 * fb_amount * fb_amount) / self.sample_rate as f32;
        for channel in 0..self.channel_count {
            self.fb_filters[channel].set_f_q(fb_cutoff, 1.0);
            let input = if channel == 0 { input_left } else { input_right };
            for frame in 0..frames {
                let fb_raw = if frame < self.fb_frames {
                    self.fb_scratch[channel][frame]
                } else {
                    0.0
                };
                let fb = self.fb_filters[channel].process_highpass(fb_raw);
                let dry = input[frame];
                self.write_scratch[channel][frame] =
                    dry + fb_gain * (soft_clip(fb_gain * 1.4 * fb + dry) - dry);
            }
        }

        // record, unless frozen; crossfade the first samples when writes resume
        if !freeze {
            let fade_in = self.frozen;
            for channel in 0..self.channel_count {
                self.buffers[channel].write(&self.write_scratch[channel][..frames], fade_in);
            }
        }
        self.frozen = freeze;

        // render the wet signal of the active player into the output slices
        match self.current_mode {
            PlaybackMode::Granular => {
                self.granular
                    .process(&self.buffers, &resolved, output_left, output_right)
            }
            PlaybackMode::LoopingDelay => {
                self.looper
                    .process(&self.buffers, &resolved, output_left, output_right);
                // the frozen loop replays verbatim, so transposition only runs while recording
                if !freeze {
                    self.pitch_shifter.process(
                        output_left,
                        output_right,
                        resolved.pitch,
                        resolved.size,
                    );
                }
            }
            PlaybackMode::Shimmer => {
                self.shimmer
                    .process(&self.buffers, &resolved, output_left, output_right)
            }
        }

        // V-shaped crossfade envelope around mode swaps
        if self.crossfade_remaining > 0 {
            for frame in 0..frames {
                if self.crossfade_remaining == 0 {
                    break;
                }
                let progress =
                    1.0 - self.crossfade_remaining as f32 / CROSSFADE_FRAMES as f32;
                let gain = if progress < 0.5 {
                    1.0 - smoothstep(progress * 2.0)
                } else {
                    smoothstep(progress * 2.0 - 1.0)
                };
                output_left[frame] *= gain;
                output_right[frame] *= gain;
                self.crossfade_remaining -= 1;
            }
        }

        // diffusion network, with a mode dependent amount
        let diffusion = match self.current_mode {
            PlaybackMode::Granular => ((resolved.texture - 0.75) * 4.0).clamp(0.0, 1.0),
            PlaybackMode::LoopingDelay => resolved.density,
            PlaybackMode::Shimmer => 0.7 + 0.3 * resolved.density,
        };
        self.diffuser.process(output_left, output_right, diffusion);

        // texture driven filter sweep, only in looping delay mode
        if self.current_mode == PlaybackMode::LoopingDelay {
            let texture = resolved.texture;
            let lp_semitones = if texture < 0.5 { texture - 0.5 } else { 0.0 };
            let hp_semitones = if texture < 0.5 { -0.5 } else { texture - 1.0 };
            let lp_cutoff = 0.5 * semitones_to_ratio(lp_semitones * 216.0);
            let hp_cutoff = 0.25 * semitones_to_ratio(hp_semitones * 216.0);
            let lp_q = 1.0 + 3.0 * (1.0 - resolved.feedback) * (0.5 - lp_cutoff);
            for channel in 0..2 {
                self.post_lowpass[channel].set_f_q(lp_cutoff, lp_q);
                self.post_highpass[channel].set_f_q(hp_cutoff, 1.0);
            }
            for frame in 0..frames {
                output_left[frame] =
                    self.post_lowpass[0].process_lowpass(output_left[frame]);
                output_left[frame] =
                    self.post_highpass[0].process_highpass(output_left[frame]);
                output_right[frame] =
                    self.post_lowpass[1].process_lowpass(output_right[frame]);
                output_right[frame] =
                    self.post_highpass[1].process_highpass(output_right[frame]);
            }
        }

        // capture the wet output for the next block's feedback, then mix dry and wet
        self.fb_scratch[0][..frames].copy_from_slice(output_left);
        self.fb_scratch[1][..frames].copy_from_slice(output_right);
        self.fb_frames = frames;

        for frame in 0..frames {
            let dry_wet = self.dry_wet.next_value();
            let dry_left = self.dry_scratch[0][frame];
            let dry_right = if stereo {
                self.dry_scratch[1][frame]
            } else {
                dry_left
            };
            output_left[frame] = dry_left + dry_wet * (output_left[frame] - dry_left);
            output_right[frame] = dry_right + dry_wet * (output_right[frame] - dry_right);
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Clonable, lock-free sender for [`GranularParameters`] snapshots, obtained from
/// [`GranularProcessor::parameter_sender`].
#[derive(Debug, Clone)]
pub struct GranularParameterSender {
    queue: Arc<ArrayQueue<GranularParameters>>,
}

impl GranularParameterSender {
    /// Validate and schedule a parameter snapshot for the next processed block.
    pub fn send(&self, parameters: GranularParameters) -> Result<(), Error> {
        parameters.validate()?;
        self.queue.push(parameters).map_err(|_| {
            Error::SendError("Granular parameter queue is full".to_string())
        })
    }
}

// -------------------------------------------------------------------------------------------------

/// [`AudioUnit`] front end for the [`GranularProcessor`], processing interleaved buffers and
/// exposing all parameters as automatable descriptors.
#[derive(Debug)]
pub struct GranularProcessorUnit {
    processor: GranularProcessor,
    input_planar: Vec<Vec<f32>>,
    output_planar: Vec<Vec<f32>>,
    max_frames: usize,
}

impl GranularProcessorUnit {
    pub const UNIT_NAME: &'static str = "granular processor";

    pub const MODE_ID: FourCC = FourCC(*b"mode");
    pub const POSITION_ID: FourCC = FourCC(*b"posn");
    pub const SIZE_ID: FourCC = FourCC(*b"size");
    pub const PITCH_ID: FourCC = FourCC(*b"ptch");
    pub const DENSITY_ID: FourCC = FourCC(*b"dnst");
    pub const TEXTURE_ID: FourCC = FourCC(*b"txtr");
    pub const DRY_WET_ID: FourCC = FourCC(*b"dwet");
    pub const FEEDBACK_ID: FourCC = FourCC(*b"fdbk");
    pub const FREEZE_ID: FourCC = FourCC(*b"frze");

    const DEFAULT_MAX_FRAMES: usize = 2048;

    /// Create a new unit for the given sample rate and channel count (1 or 2).
    pub fn new(sample_rate: u32, channel_count: usize) -> Result<Self, Error> {
        let processor = GranularProcessor::new(sample_rate, channel_count)?;
        let mut unit = Self {
            processor,
            input_planar: Vec::new(),
            output_planar: Vec::new(),
            max_frames: 0,
        };
        unit.allocate_scratch(Self::DEFAULT_MAX_FRAMES);
        Ok(unit)
    }

    /// Access to the wrapped processor, e.g. for its parameter sender.
    pub fn processor(&self) -> &GranularProcessor {
        &self.processor
    }

    /// Mutable access to the wrapped processor.
    pub fn processor_mut(&mut self) -> &mut GranularProcessor {
        &mut self.processor
    }

    fn allocate_scratch(&mut self, max_frames: usize) {
        self.max_frames = max_frames;
        self.input_planar = (0..self.processor.channel_count())
            .map(|_| vec![0.0; max_frames])
            .collect();
        // wet rendering is always stereo, also for mono processors
        self.output_planar = (0..2).map(|_| vec![0.0; max_frames]).collect();
    }
}

impl AudioUnit for GranularProcessorUnit {
    fn name(&self) -> &'static str {
        Self::UNIT_NAME
    }

    fn parameters(&self) -> Vec<&dyn ClonableParameter> {
        vec![
            self.processor.mode.description(),
            self.processor.position.description(),
            self.processor.size.description(),
            self.processor.pitch.description(),
            self.processor.density.description(),
            self.processor.texture.description(),
            self.processor.dry_wet.description(),
            self.processor.feedback.description(),
            self.processor.freeze.description(),
        ]
    }

    fn input_channels(&self) -> usize {
        self.processor.channel_count()
    }

    fn output_channels(&self) -> usize {
        self.processor.channel_count()
    }

    fn initialize(&mut self, sample_rate: u32, max_frames: usize) -> Result<(), Error> {
        if max_frames == 0 {
            return Err(Error::ParameterError(
                "Maximum block size must not be zero".to_string(),
            ));
        }
        self.processor.set_sample_rate(sample_rate)?;
        self.allocate_scratch(max_frames);
        Ok(())
    }

    fn reset(&mut self) {
        self.processor.reset();
    }

    fn process(&mut self, input: &[f32], output: &mut [f32]) {
        let channels = self.processor.channel_count();
        debug_assert_eq!(input.len() % channels, 0);
        debug_assert_eq!(output.len() % channels, 0);

        let mut frame_offset = 0;
        let frames = (input.len() / channels).min(output.len() / channels);
        while frame_offset < frames {
            let chunk = (frames - frame_offset).min(self.max_frames);
            let interleaved =
                &input[frame_offset * channels..(frame_offset + chunk) * channels];
            interleaved_to_planar(interleaved, &mut self.input_planar);

            let (left, right) = self.output_planar.split_at_mut(1);
            let mono_input = &self.input_planar[0];
            let right_input = if channels == 2 {
                &self.input_planar[1]
            } else {
                mono_input
            };
            self.processor.process(
                &mono_input[..chunk],
                &right_input[..chunk],
                &mut left[0][..chunk],
                &mut right[0][..chunk],
            );

            let out_interleaved =
                &mut output[frame_offset * channels..(frame_offset + chunk) * channels];
            planar_to_interleaved(&self.output_planar[..channels], out_interleaved);
            frame_offset += chunk;
        }
    }

    fn process_parameter_update(
        &mut self,
        id: FourCC,
        value: &ParameterValueUpdate,
    ) -> Result<(), Error> {
        match id {
            Self::MODE_ID => self.processor.mode.apply_update(value),
            Self::POSITION_ID => self.processor.position.apply_update(value),
            Self::SIZE_ID => self.processor.size.apply_update(value),
            Self::PITCH_ID => self.processor.pitch.apply_update(value),
            Self::DENSITY_ID => self.processor.density.apply_update(value),
            Self::TEXTURE_ID => self.processor.texture.apply_update(value),
            Self::DRY_WET_ID => self.processor.dry_wet.apply_update(value),
            Self::FEEDBACK_ID => self.processor.feedback.apply_update(value),
            Self::FREEZE_ID => self.processor.freeze.apply_update(value),
            _ => {
                return Err(Error::ParameterError(format!(
                    "Unknown granular parameter id: '{id}'"
                )))
            }
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
