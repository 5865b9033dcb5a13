//! Error types for note loading, rendering and compositing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Input length mismatch: {audio} note buffers, {start_times} start times, {end_times} end times, {velocities} velocities")]
    LengthMismatch {
        audio: usize,
        start_times: usize,
        end_times: usize,
        velocities: usize,
    },

    #[error("Rendered audio for note {index} has {available} samples, envelope needs {needed}")]
    UndersizedNoteAudio {
        index: usize,
        needed: usize,
        available: usize,
    },

    #[error("Renderer produces {renderer} Hz audio, clip is {clip} Hz")]
    SampleRateMismatch { renderer: u32, clip: u32 },

    #[error("No sample for pitch {0} in sample bank")]
    MissingSample(u8),

    #[error("Pitch {pitch} outside generator range {min}..={max}")]
    PitchOutOfRange { pitch: u8, min: u8, max: u8 },

    #[error("Latent vector has {actual} values, generator expects {expected}")]
    LatentSize { expected: usize, actual: usize },

    #[error("Unsupported channel layout: {0} channels")]
    UnsupportedChannels(u16),

    #[error("Generator output `{0}` not found")]
    MissingOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("MIDI error: {0}")]
    Midi(#[from] midly::Error),

    #[error("Model error: {0}")]
    Model(#[from] ort::Error),

    #[error("Resampler setup failed: {0}")]
    ResamplerConstruction(#[from] rubato::ResamplerConstructionError),

    #[error("Resampling failed: {0}")]
    Resample(#[from] rubato::ResampleError),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CompositorError>;
