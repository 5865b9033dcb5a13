// Compositing
pub const AUDIO_SAMPLE_RATE: u32 = 16000;
pub const ATTACK_SECONDS: f64 = 0.010;
pub const RELEASE_SECONDS: f64 = 0.3;
pub const MAX_NOTE_SECONDS: f64 = 3.0;
pub const CLIP_TAIL_SECONDS: f64 = 3.0;
pub const CLIP_HEADROOM: f32 = 0.5;
pub const MAX_VELOCITY: f32 = 127.0;

// MIDI Conversion
pub const MIN_PITCH: u8 = 36;
pub const MAX_PITCH: u8 = 84;
pub const DEFAULT_TEMPO_MICROS: u32 = 500_000;
pub const TICKS_PER_BEAT: u16 = 480;

// Generator
pub const GENERATOR_MIN_PITCH: u8 = 24;
pub const GENERATOR_PITCH_COUNT: usize = 61;
pub const LATENT_SIZE: usize = 256;
