/// Sound effects: short procedural chiptune cues via rodio.
///
/// Each cue is a list of notes (frequency sweep, length, waveform) rendered
/// to a 16-bit mono WAV buffer once at start-up. Playback is fire-and-forget.
///
/// Without the `sound` feature `SoundEngine` is a stub that plays nothing.

use crate::sim::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sfx {
    Jump,
    Climb,
    JumpCredit,
    Smash,
    Pickup,
    Shot,
    Throw,
    BossHit,
    Die,
    Clear,
}

impl Sfx {
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    pub const ALL: [Sfx; 10] = [
        Sfx::Jump, Sfx::Climb, Sfx::JumpCredit, Sfx::Smash, Sfx::Pickup,
        Sfx::Shot, Sfx::Throw, Sfx::BossHit, Sfx::Die, Sfx::Clear,
    ];
}

/// The cue for an event, if it has one.
pub fn sfx_for(event: &GameEvent) -> Option<Sfx> {
    Some(match event {
        GameEvent::Jumped => Sfx::Jump,
        GameEvent::LadderGrabbed => Sfx::Climb,
        GameEvent::BarrelJumped { .. } => Sfx::JumpCredit,
        GameEvent::BarrelSmashed { .. } | GameEvent::MonkeyDestroyed { .. } => Sfx::Smash,
        GameEvent::PickupCollected { .. } => Sfx::Pickup,
        GameEvent::ShotFired => Sfx::Shot,
        GameEvent::BananaThrown { .. } => Sfx::Throw,
        GameEvent::BossHit { .. } => Sfx::BossHit,
        GameEvent::PlayerKilled { .. } => Sfx::Die,
        GameEvent::LevelCleared { .. } => Sfx::Clear,
    })
}

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: HashMap<Sfx, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        /// None when no audio device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::info!("no audio output, sound disabled: {e}");
                    return None;
                }
            };
            let buffers = Sfx::ALL.iter()
                .map(|&sfx| (sfx, Arc::new(make_wav(&render(cue(sfx))))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(buf) = self.buffers.get(&sfx) else { return };
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            match Decoder::new(Cursor::new(buf.as_ref().clone())) {
                Ok(src) => {
                    sink.append(src);
                    sink.detach();
                }
                Err(e) => log::warn!("could not decode {sfx:?}: {e}"),
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Cues
    // ════════════════════════════════════════════════════════════

    #[derive(Clone, Copy)]
    enum Wave {
        Square,
        Sine,
        Noise,
    }

    /// One segment: frequency sweeps linearly from `from` to `to`.
    #[derive(Clone, Copy)]
    struct Note {
        from: f32,
        to: f32,
        secs: f32,
        wave: Wave,
    }

    const fn note(from: f32, to: f32, secs: f32, wave: Wave) -> Note {
        Note { from, to, secs, wave }
    }

    use Wave::{Noise, Sine, Square};

    const JUMP: &[Note] = &[note(300.0, 700.0, 0.08, Square)];
    const CLIMB: &[Note] = &[note(500.0, 500.0, 0.03, Square), note(650.0, 650.0, 0.03, Square)];
    const JUMP_CREDIT: &[Note] = &[
        note(784.0, 784.0, 0.05, Square),
        note(1047.0, 1047.0, 0.05, Square),
        note(1319.0, 1319.0, 0.08, Square),
    ];
    const SMASH: &[Note] = &[note(180.0, 60.0, 0.14, Noise)];
    const PICKUP: &[Note] = &[
        note(523.0, 523.0, 0.05, Sine),
        note(784.0, 784.0, 0.05, Sine),
        note(1047.0, 1047.0, 0.1, Sine),
    ];
    const SHOT: &[Note] = &[note(1400.0, 400.0, 0.07, Square)];
    const THROW: &[Note] = &[note(250.0, 450.0, 0.06, Sine)];
    const BOSS_HIT: &[Note] = &[note(120.0, 90.0, 0.1, Noise), note(220.0, 110.0, 0.12, Square)];
    const DIE: &[Note] = &[
        note(440.0, 440.0, 0.12, Sine),
        note(370.0, 370.0, 0.12, Sine),
        note(311.0, 311.0, 0.12, Sine),
        note(261.0, 130.0, 0.3, Sine),
    ];
    const CLEAR: &[Note] = &[
        note(523.0, 523.0, 0.1, Square),
        note(659.0, 659.0, 0.1, Square),
        note(784.0, 784.0, 0.1, Square),
        note(1047.0, 1047.0, 0.3, Square),
    ];

    fn cue(sfx: Sfx) -> &'static [Note] {
        match sfx {
            Sfx::Jump => JUMP,
            Sfx::Climb => CLIMB,
            Sfx::JumpCredit => JUMP_CREDIT,
            Sfx::Smash => SMASH,
            Sfx::Pickup => PICKUP,
            Sfx::Shot => SHOT,
            Sfx::Throw => THROW,
            Sfx::BossHit => BOSS_HIT,
            Sfx::Die => DIE,
            Sfx::Clear => CLEAR,
        }
    }

    /// Mono f32 samples in [-1, 1]; each note fades out over its length.
    fn render(notes: &[Note]) -> Vec<f32> {
        let mut out = Vec::new();
        let mut noise: u32 = 0x2545_f491;
        let mut phase = 0.0_f32;
        for n in notes {
            let len = (SAMPLE_RATE as f32 * n.secs) as usize;
            for i in 0..len {
                let progress = i as f32 / len as f32;
                let freq = n.from + (n.to - n.from) * progress;
                phase = (phase + freq / SAMPLE_RATE as f32).fract();
                let sample = match n.wave {
                    Wave::Sine => (phase * TAU).sin(),
                    Wave::Square => if phase < 0.5 { 0.6 } else { -0.6 },
                    Wave::Noise => {
                        noise ^= noise << 13;
                        noise ^= noise >> 17;
                        noise ^= noise << 5;
                        (noise as f32 / u32::MAX as f32) * 2.0 - 1.0
                    }
                };
                out.push(sample * (1.0 - progress).powf(0.7) * 0.3);
            }
        }
        out
    }

    /// 16-bit PCM mono WAV.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_len = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_len as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_len).to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        for &s in samples {
            buf.extend_from_slice(&((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes());
        }
        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

impl SoundEngine {
    pub fn play_events(&self, events: &[GameEvent]) {
        for sfx in events.iter().filter_map(sfx_for) {
            self.play(sfx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PickupKind;
    use crate::sim::event::DeathCause;

    #[test]
    fn every_event_has_a_cue() {
        assert_eq!(sfx_for(&GameEvent::Jumped), Some(Sfx::Jump));
        assert_eq!(sfx_for(&GameEvent::BarrelSmashed { id: 1 }), Some(Sfx::Smash));
        assert_eq!(sfx_for(&GameEvent::MonkeyDestroyed { id: 1 }), Some(Sfx::Smash));
        assert_eq!(sfx_for(&GameEvent::PickupCollected { kind: PickupKind::Hammer }), Some(Sfx::Pickup));
        assert_eq!(sfx_for(&GameEvent::PlayerKilled { cause: DeathCause::TimeUp }), Some(Sfx::Die));
    }
}
