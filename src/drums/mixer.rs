use std::{any::Any, sync::Arc};

use crossbeam_queue::ArrayQueue;
use four_cc::FourCC;

use super::{
    bass_drum::AnalogBassDrum,
    fm_drum::{FmDrum, FmDrumMode},
    hi_hat::MetallicHiHat,
    snare_drum::AnalogSnareDrum,
};
use crate::{
    parameter::{
        EnumParameter, EnumParameterValue, FloatParameter, FloatParameterValue,
        ParameterValueUpdate,
    },
    unit::{AudioUnit, UnitMessage, UnitMessagePayload},
    utils::dsp::soft_limit,
    ClonableParameter, Error,
};

// -------------------------------------------------------------------------------------------------

/// Gate inputs above this level count as high when detecting trigger edges.
const GATE_THRESHOLD: f32 = 0.3;

/// Capacity of the lock-free manual trigger queue.
const TRIGGER_QUEUE_SIZE: usize = 16;

// -------------------------------------------------------------------------------------------------

/// Identifies one of the four voices of a [`DrumMixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DrumVoice {
    BassDrum,
    SnareDrum,
    HiHat,
    FmDrum,
}

/// Number of voices, and thus gate input channels, of a [`DrumMixer`].
const NUM_VOICES: usize = 4;

// -------------------------------------------------------------------------------------------------

/// Messages consumed by a [`DrumMixer`] via [`AudioUnit::process_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrumMixerMessage {
    /// Manually trigger the given voice at the start of the next block, as if its gate input
    /// had a rising edge there.
    Trigger(DrumVoice),
}

impl UnitMessage for DrumMixerMessage {
    fn unit_name(&self) -> &'static str {
        DrumMixer::UNIT_NAME
    }
    fn payload(&self) -> &dyn Any {
        self
    }
}

// -------------------------------------------------------------------------------------------------

/// Clonable, lock-free sender to trigger [`DrumMixer`] voices from other threads.
///
/// Queued triggers are picked up at the start of the next processed block.
#[derive(Debug, Clone)]
pub struct DrumTriggerSender {
    queue: Arc<ArrayQueue<DrumVoice>>,
}

impl DrumTriggerSender {
    /// Schedule a manual trigger for the given voice. Fails when the audio thread did not
    /// drain previously sent triggers in time.
    pub fn send(&self, voice: DrumVoice) -> Result<(), Error> {
        self.queue
            .push(voice)
            .map_err(|_| Error::SendError("Drum trigger queue is full".to_string()))
    }
}

// -------------------------------------------------------------------------------------------------

/// Parameter value set of a single drum voice: accent, frequency, tone, decay and one voice
/// specific extra control.
#[derive(Debug)]
struct VoiceParameterValues {
    accent: FloatParameterValue,
    frequency: FloatParameterValue,
    tone: FloatParameterValue,
    decay: FloatParameterValue,
    extra: FloatParameterValue,
}

impl VoiceParameterValues {
    fn new(
        accent: FloatParameter,
        frequency: FloatParameter,
        tone: FloatParameter,
        decay: FloatParameter,
        extra: FloatParameter,
    ) -> Self {
        Self {
            accent: FloatParameterValue::new(accent),
            frequency: FloatParameterValue::new(frequency),
            tone: FloatParameterValue::new(tone),
            decay: FloatParameterValue::new(decay),
            extra: FloatParameterValue::new(extra),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Drum voice rack: four analog modeled voices triggered from per voice gate inputs, summed
/// into a mono output through a soft limiter.
///
/// The unit consumes four gate channels, one per voice in [`DrumVoice`] order. A voice fires on
/// the rising edge of its gate, so a gate held high plays a single hit. Voices can also be
/// triggered manually, either with a [`DrumMixerMessage`] or lock-free from other threads via
/// [`Self::trigger_sender`]. Manual triggers fire at the start of the next block.
#[derive(Debug)]
pub struct DrumMixer {
    sample_rate: u32,

    bass_drum: AnalogBassDrum,
    snare_drum: AnalogSnareDrum,
    hi_hat: MetallicHiHat,
    fm_drum: FmDrum,

    bass_parameters: VoiceParameterValues,
    snare_parameters: VoiceParameterValues,
    hi_hat_parameters: VoiceParameterValues,
    fm_parameters: VoiceParameterValues,
    fm_mode: EnumParameterValue<FmDrumMode>,

    last_gates: [f32; NUM_VOICES],
    pending_triggers: [bool; NUM_VOICES],
    trigger_queue: Arc<ArrayQueue<DrumVoice>>,
}

impl DrumMixer {
    pub const UNIT_NAME: &'static str = "drum mixer";

    pub const BASS_ACCENT_ID: FourCC = FourCC(*b"bacc");
    pub const BASS_FREQUENCY_ID: FourCC = FourCC(*b"bfrq");
    pub const BASS_TONE_ID: FourCC = FourCC(*b"bton");
    pub const BASS_DECAY_ID: FourCC = FourCC(*b"bdcy");
    pub const BASS_ATTACK_ID: FourCC = FourCC(*b"batk");

    pub const SNARE_ACCENT_ID: FourCC = FourCC(*b"sacc");
    pub const SNARE_FREQUENCY_ID: FourCC = FourCC(*b"sfrq");
    pub const SNARE_TONE_ID: FourCC = FourCC(*b"ston");
    pub const SNARE_DECAY_ID: FourCC = FourCC(*b"sdcy");
    pub const SNARE_SNAPPY_ID: FourCC = FourCC(*b"ssnp");

    pub const HI_HAT_ACCENT_ID: FourCC = FourCC(*b"hacc");
    pub const HI_HAT_FREQUENCY_ID: FourCC = FourCC(*b"hfrq");
    pub const HI_HAT_TONE_ID: FourCC = FourCC(*b"hton");
    pub const HI_HAT_DECAY_ID: FourCC = FourCC(*b"hdcy");
    pub const HI_HAT_NOISINESS_ID: FourCC = FourCC(*b"hnse");

    pub const FM_ACCENT_ID: FourCC = FourCC(*b"facc");
    pub const FM_FREQUENCY_ID: FourCC = FourCC(*b"ffrq");
    pub const FM_TONE_ID: FourCC = FourCC(*b"fton");
    pub const FM_DECAY_ID: FourCC = FourCC(*b"fdcy");
    pub const FM_SWEEP_ID: FourCC = FourCC(*b"fswp");
    pub const FM_MODE_ID: FourCC = FourCC(*b"fmod");

    /// Create a new drum mixer for the given sample rate.
    pub fn new(sample_rate: u32) -> Result<Self, Error> {
        if sample_rate == 0 {
            return Err(Error::ParameterError(
                "Sample rate must not be zero".to_string(),
            ));
        }

        Ok(Self {
            sample_rate,
            bass_drum: AnalogBassDrum::new(sample_rate),
            snare_drum: AnalogSnareDrum::new(sample_rate),
            hi_hat: MetallicHiHat::new(sample_rate),
            fm_drum: FmDrum::new(sample_rate),
            bass_parameters: VoiceParameterValues::new(
                FloatParameter::new(Self::BASS_ACCENT_ID, "Bass Accent", 0.0..=1.0, 0.8),
                FloatParameter::new(Self::BASS_FREQUENCY_ID, "Bass Frequency", 20.0..=120.0, 55.0)
                    .with_unit("hz"),
                FloatParameter::new(Self::BASS_TONE_ID, "Bass Tone", 0.0..=1.0, 0.5),
                FloatParameter::new(Self::BASS_DECAY_ID, "Bass Decay", 0.0..=1.0, 0.5),
                FloatParameter::new(Self::BASS_ATTACK_ID, "Bass Attack", 0.0..=1.0, 0.25),
            ),
            snare_parameters: VoiceParameterValues::new(
                FloatParameter::new(Self::SNARE_ACCENT_ID, "Snare Accent", 0.0..=1.0, 0.8),
                FloatParameter::new(
                    Self::SNARE_FREQUENCY_ID,
                    "Snare Frequency",
                    100.0..=400.0,
                    200.0,
                )
                .with_unit("hz"),
                FloatParameter::new(Self::SNARE_TONE_ID, "Snare Tone", 0.0..=1.0, 0.5),
                FloatParameter::new(Self::SNARE_DECAY_ID, "Snare Decay", 0.0..=1.0, 0.5),
                FloatParameter::new(Self::SNARE_SNAPPY_ID, "Snare Snappy", 0.0..=1.0, 0.5),
            ),
            hi_hat_parameters: VoiceParameterValues::new(
                FloatParameter::new(Self::HI_HAT_ACCENT_ID, "HiHat Accent", 0.0..=1.0, 0.8),
                FloatParameter::new(
                    Self::HI_HAT_FREQUENCY_ID,
                    "HiHat Frequency",
                    200.0..=800.0,
                    420.0,
                )
                .with_unit("hz"),
                FloatParameter::new(Self::HI_HAT_TONE_ID, "HiHat Tone", 0.0..=1.0, 0.5),
                FloatParameter::new(Self::HI_HAT_DECAY_ID, "HiHat Decay", 0.0..=1.0, 0.4),
                FloatParameter::new(Self::HI_HAT_NOISINESS_ID, "HiHat Noisiness", 0.0..=1.0, 0.5),
            ),
            fm_parameters: VoiceParameterValues::new(
                FloatParameter::new(Self::FM_ACCENT_ID, "FM Accent", 0.0..=1.0, 0.8),
                FloatParameter::new(Self::FM_FREQUENCY_ID, "FM Frequency", 30.0..=200.0, 80.0)
                    .with_unit("hz"),
                FloatParameter::new(Self::FM_TONE_ID, "FM Tone", 0.0..=1.0, 0.3),
                FloatParameter::new(Self::FM_DECAY_ID, "FM Decay", 0.0..=1.0, 0.5),
                FloatParameter::new(Self::FM_SWEEP_ID, "FM Sweep", 0.0..=1.0, 0.5),
            ),
            fm_mode: EnumParameterValue::new(EnumParameter::new(
                Self::FM_MODE_ID,
                "FM Mode",
                FmDrumMode::default(),
            )),
            last_gates: [0.0; NUM_VOICES],
            pending_triggers: [false; NUM_VOICES],
            trigger_queue: Arc::new(ArrayQueue::new(TRIGGER_QUEUE_SIZE)),
        })
    }

    #[inline(always)]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Create a new lock-free manual trigger sender for this mixer.
    pub fn trigger_sender(&self) -> DrumTriggerSender {
        DrumTriggerSender {
            queue: Arc::clone(&self.trigger_queue),
        }
    }
}

impl AudioUnit for DrumMixer {
    fn name(&self) -> &'static str {
        Self::UNIT_NAME
    }

    fn parameters(&self) -> Vec<&dyn ClonableParameter> {
        vec![
            self.bass_parameters.accent.description(),
            self.bass_parameters.frequency.description(),
            self.bass_parameters.tone.description(),
            self.bass_parameters.decay.description(),
            self.bass_parameters.extra.description(),
            self.snare_parameters.accent.description(),
            self.snare_parameters.frequency.description(),
            self.snare_parameters.tone.description(),
            self.snare_parameters.decay.description(),
            self.snare_parameters.extra.description(),
            self.hi_hat_parameters.accent.description(),
            self.hi_hat_parameters.frequency.description(),
            self.hi_hat_parameters.tone.description(),
            self.hi_hat_parameters.decay.description(),
            self.hi_hat_parameters.extra.description(),
            self.fm_parameters.accent.description(),
            self.fm_parameters.frequency.description(),
            self.fm_parameters.tone.description(),
            self.fm_parameters.decay.description(),
            self.fm_parameters.extra.description(),
            self.fm_mode.description(),
        ]
    }

    fn input_channels(&self) -> usize {
        NUM_VOICES
    }

    fn output_channels(&self) -> usize {
        1
    }

    fn initialize(&mut self, sample_rate: u32, _max_frames: usize) -> Result<(), Error> {
        if sample_rate == 0 {
            return Err(Error::ParameterError(
                "Sample rate must not be zero".to_string(),
            ));
        }
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.bass_drum = AnalogBassDrum::new(sample_rate);
            self.snare_drum = AnalogSnareDrum::new(sample_rate);
            self.hi_hat = MetallicHiHat::new(sample_rate);
            self.fm_drum = FmDrum::new(sample_rate);
            self.fm_drum.set_mode(*self.fm_mode.value());
        }
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.bass_drum.reset();
        self.snare_drum.reset();
        self.hi_hat.reset();
        self.fm_drum.reset();
        self.last_gates = [0.0; NUM_VOICES];
        self.pending_triggers = [false; NUM_VOICES];
        while self.trigger_queue.pop().is_some() {}
    }

    fn process(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len() % NUM_VOICES, 0);

        // collect manual triggers once per block, they fire together with the first frame
        let mut manual_triggers = [false; NUM_VOICES];
        while let Some(voice) = self.trigger_queue.pop() {
            manual_triggers[voice as usize] = true;
        }
        for (manual, pending) in manual_triggers
            .iter_mut()
            .zip(self.pending_triggers.iter_mut())
        {
            *manual |= std::mem::take(pending);
        }

        let sample_rate = self.sample_rate as f32;
        let gate_frames = input.chunks_exact(NUM_VOICES);
        debug_assert_eq!(gate_frames.len(), output.len());

        for (frame, (gates, out)) in gate_frames.zip(output.iter_mut()).enumerate() {
            let mut triggers = [false; NUM_VOICES];
            for (trigger, (&gate, last_gate)) in triggers
                .iter_mut()
                .zip(gates.iter().zip(self.last_gates.iter_mut()))
            {
                *trigger = gate > GATE_THRESHOLD && *last_gate <= GATE_THRESHOLD;
                *last_gate = gate;
            }
            if frame == 0 {
                for (trigger, manual) in triggers.iter_mut().zip(manual_triggers) {
                    *trigger |= manual;
                }
            }

            let bass = self.bass_drum.process(
                triggers[DrumVoice::BassDrum as usize],
                self.bass_parameters.accent.value(),
                self.bass_parameters.frequency.value() / sample_rate,
                self.bass_parameters.tone.value(),
                self.bass_parameters.decay.value(),
                self.bass_parameters.extra.value(),
            );
            let snare = self.snare_drum.process(
                triggers[DrumVoice::SnareDrum as usize],
                self.snare_parameters.accent.value(),
                self.snare_parameters.frequency.value() / sample_rate,
                self.snare_parameters.tone.value(),
                self.snare_parameters.decay.value(),
                self.snare_parameters.extra.value(),
            );
            let hi_hat = self.hi_hat.process(
                triggers[DrumVoice::HiHat as usize],
                self.hi_hat_parameters.accent.value(),
                self.hi_hat_parameters.frequency.value() / sample_rate,
                self.hi_hat_parameters.tone.value(),
                self.hi_hat_parameters.decay.value(),
                self.hi_hat_parameters.extra.value(),
            );
            let fm = self.fm_drum.process(
                triggers[DrumVoice::FmDrum as usize],
                self.fm_parameters.accent.value(),
                self.fm_parameters.frequency.value() / sample_rate,
                self.fm_parameters.tone.value(),
                self.fm_parameters.decay.value(),
                self.fm_parameters.extra.value(),
            );

            let mix =
                1.2 * bass + 0.6 * snare + 0.5 * hi_hat + self.fm_mode.value().mix_gain() * fm;
            *out = soft_limit(mix);
        }
    }

    fn process_parameter_update(
        &mut self,
        id: FourCC,
        value: &ParameterValueUpdate,
    ) -> Result<(), Error> {
        match id {
            Self::BASS_ACCENT_ID => self.bass_parameters.accent.apply_update(value),
            Self::BASS_FREQUENCY_ID => self.bass_parameters.frequency.apply_update(value),
            Self::BASS_TONE_ID => self.bass_parameters.tone.apply_update(value),
            Self::BASS_DECAY_ID => self.bass_parameters.decay.apply_update(value),
            Self::BASS_ATTACK_ID => self.bass_parameters.extra.apply_update(value),
            Self::SNARE_ACCENT_ID => self.snare_parameters.accent.apply_update(value),
            Self::SNARE_FREQUENCY_ID => self.snare_parameters.frequency.apply_update(value),
            Self::SNARE_TONE_ID => self.snare_parameters.tone.apply_update(value),
            Self::SNARE_DECAY_ID => self.snare_parameters.decay.apply_update(value),
            Self::SNARE_SNAPPY_ID => self.snare_parameters.extra.apply_update(value),
            Self::HI_HAT_ACCENT_ID => self.hi_hat_parameters.accent.apply_update(value),
            Self::HI_HAT_FREQUENCY_ID => self.hi_hat_parameters.frequency.apply_update(value),
            Self::HI_HAT_TONE_ID => self.hi_hat_parameters.tone.apply_update(value),
            Self::HI_HAT_DECAY_ID => self.hi_hat_parameters.decay.apply_update(value),
            Self::HI_HAT_NOISINESS_ID => self.hi_hat_parameters.extra.apply_update(value),
            Self::FM_ACCENT_ID => self.fm_parameters.accent.apply_update(value),
            Self::FM_FREQUENCY_ID => self.fm_parameters.frequency.apply_update(value),
            Self::FM_TONE_ID => self.fm_parameters.tone.apply_update(value),
            Self::FM_DECAY_ID => self.fm_parameters.decay.apply_update(value),
            Self::FM_SWEEP_ID => self.fm_parameters.extra.apply_update(value),
            Self::FM_MODE_ID => {
                self.fm_mode.apply_update(value);
                self.fm_drum.set_mode(*self.fm_mode.value());
            }
            _ => {
                return Err(Error::ParameterError(format!(
                    "Unknown drum mixer parameter id: '{id}'"
                )))
            }
        }
        Ok(())
    }

    fn process_message(&mut self, message: &UnitMessagePayload) -> Result<(), Error> {
        if let Some(message) = message.payload().downcast_ref::<DrumMixerMessage>() {
            match message {
                DrumMixerMessage::Trigger(voice) => {
                    self.pending_triggers[*voice as usize] = true;
                }
            }
            Ok(())
        } else {
            Err(Error::ParameterError(format!(
                "Audio unit '{}' received an unexpected message: {:?}",
                self.name(),
                message
            )))
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;

    fn gate_input(frames: usize, voice: DrumVoice, high: impl Fn(usize) -> bool) -> Vec<f32> {
        let mut input = vec![0.0; frames * NUM_VOICES];
        for frame in 0..frames {
            if high(frame) {
                input[frame * NUM_VOICES + voice as usize] = 1.0;
            }
        }
        input
    }

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    #[test]
    fn gate_held_high_triggers_once() {
        let mut mixer = DrumMixer::new(SAMPLE_RATE).unwrap();
        mixer.initialize(SAMPLE_RATE, SAMPLE_RATE as usize).unwrap();

        // hold the bass gate high for half a second, drop it, then raise it again
        let frames = SAMPLE_RATE as usize;
        let gate_off = frames / 2;
        let gate_on_again = frames * 3 / 4;
        let input = gate_input(frames, DrumVoice::BassDrum, |frame| {
            frame < gate_off || frame >= gate_on_again
        });
        let mut output = vec![0.0; frames];
        mixer.process(&input, &mut output);

        // a held gate plays a single decaying hit
        let attack = peak(&output[..4096]);
        let held_tail = peak(&output[gate_off - 4096..gate_off]);
        assert!(attack > 0.05);
        assert!(held_tail < attack * 0.1);

        // the second rising edge fires a fresh hit
        let before_second_edge = peak(&output[gate_on_again - 4096..gate_on_again]);
        let second_attack = peak(&output[gate_on_again..gate_on_again + 4096]);
        assert!(second_attack > 4.0 * before_second_edge);
        assert!(second_attack > attack * 0.5);
    }

    #[test]
    fn limiter_keeps_the_sum_bounded() {
        let mut mixer = DrumMixer::new(SAMPLE_RATE).unwrap();
        mixer.initialize(SAMPLE_RATE, SAMPLE_RATE as usize).unwrap();
        for id in [
            DrumMixer::BASS_ACCENT_ID,
            DrumMixer::SNARE_ACCENT_ID,
            DrumMixer::HI_HAT_ACCENT_ID,
            DrumMixer::FM_ACCENT_ID,
        ] {
            mixer
                .process_parameter_update(id, &ParameterValueUpdate::Normalized(1.0))
                .unwrap();
        }

        // hammer all four voices at once every 50 ms
        let frames = SAMPLE_RATE as usize;
        let mut input = vec![0.0; frames * NUM_VOICES];
        for frame in 0..frames {
            if (frame / 2205) % 2 == 0 {
                for gate in 0..NUM_VOICES {
                    input[frame * NUM_VOICES + gate] = 1.0;
                }
            }
        }
        let mut output = vec![0.0; frames];
        mixer.process(&input, &mut output);

        assert!(output.iter().all(|s| s.is_finite() && s.abs() < 1.0));
        assert!(peak(&output) > 0.1);
    }

    #[test]
    fn manual_triggers_fire_at_block_starts() {
        let mut mixer = DrumMixer::new(SAMPLE_RATE).unwrap();
        mixer.initialize(SAMPLE_RATE, 512).unwrap();

        let input = vec![0.0; 512 * NUM_VOICES];
        let mut output = vec![0.0; 512];

        // without any trigger the mixer is silent
        mixer.process(&input, &mut output);
        assert!(output.iter().all(|s| *s == 0.0));

        // trigger via message
        mixer
            .process_message(&DrumMixerMessage::Trigger(DrumVoice::BassDrum))
            .unwrap();
        mixer.process(&input, &mut output);
        assert!(peak(&output) > 0.0);

        // trigger via the lock-free sender
        let sender = mixer.trigger_sender();
        sender.send(DrumVoice::SnareDrum).unwrap();
        mixer.process(&input, &mut output);
        assert!(peak(&output[..16]) > 0.0);
    }

    #[test]
    fn parameter_surface() {
        let mut mixer = DrumMixer::new(SAMPLE_RATE).unwrap();
        assert_eq!(mixer.parameters().len(), 21);
        assert_eq!(mixer.input_channels(), NUM_VOICES);
        assert_eq!(mixer.output_channels(), 1);
        assert!(mixer
            .parameters()
            .iter()
            .any(|parameter| parameter.id() == DrumMixer::SNARE_SNAPPY_ID));

        mixer
            .process_parameter_update(
                DrumMixer::BASS_FREQUENCY_ID,
                &ParameterValueUpdate::Raw(Box::new(80.0f32)),
            )
            .unwrap();
        assert_eq!(mixer.bass_parameters.frequency.value(), 80.0);

        mixer
            .process_parameter_update(
                DrumMixer::FM_MODE_ID,
                &ParameterValueUpdate::Raw(Box::new(FmDrumMode::Metal)),
            )
            .unwrap();
        assert_eq!(mixer.fm_drum.mode(), FmDrumMode::Metal);

        assert!(mixer
            .process_parameter_update(FourCC(*b"xxxx"), &ParameterValueUpdate::Normalized(0.5))
            .is_err());
        assert!(mixer
            .process_message(&DrumMixerMessage::Trigger(DrumVoice::HiHat))
            .is_ok());
    }
}
