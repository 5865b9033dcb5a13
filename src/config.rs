//! Configuration for compositing and for the MIDI-to-WAV pipeline

use std::{fs, path::{Path, PathBuf}};

use serde::Deserialize;

use crate::constants::{
    ATTACK_SECONDS, AUDIO_SAMPLE_RATE, CLIP_HEADROOM, CLIP_TAIL_SECONDS, GENERATOR_MIN_PITCH,
    GENERATOR_PITCH_COUNT, LATENT_SIZE, MAX_NOTE_SECONDS, MAX_PITCH, MIN_PITCH, RELEASE_SECONDS,
};
use crate::error::Result;

/// Envelope and mixdown parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Sample rate of rendered notes and of the output clip (Hz)
    pub sample_rate: u32,
    /// Linear attack ramp (seconds), carved out of the sustain
    pub attack: f64,
    /// Linear release ramp (seconds), appended after the sustain
    pub release: f64,
    /// Longest sustain a note may have (seconds)
    pub max_note_length: f64,
    /// Silence kept after the last note end (seconds)
    pub tail: f64,
    /// Peak level of the normalized clip
    pub headroom: f32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            sample_rate: AUDIO_SAMPLE_RATE,
            attack: ATTACK_SECONDS,
            release: RELEASE_SECONDS,
            max_note_length: MAX_NOTE_SECONDS,
            tail: CLIP_TAIL_SECONDS,
            headroom: CLIP_HEADROOM,
        }
    }
}

/// Where note audio comes from
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RendererConfig {
    /// Directory of `<pitch>.wav` files
    SampleBank { directory: PathBuf },
    /// Exported generator graph
    Onnx {
        model: PathBuf,
        latent: Vec<f32>,
        #[serde(default = "default_latent_input")]
        latent_input: String,
        #[serde(default = "default_pitch_input")]
        pitch_input: String,
        #[serde(default = "default_audio_output")]
        audio_output: String,
        #[serde(default = "default_generator_min_pitch")]
        min_pitch: u8,
        #[serde(default = "default_generator_pitch_count")]
        pitch_count: usize,
        #[serde(default = "default_latent_size")]
        latent_size: usize,
    },
}

fn default_latent_input() -> String {
    "z".to_string()
}

fn default_pitch_input() -> String {
    "pitch".to_string()
}

fn default_audio_output() -> String {
    "audio".to_string()
}

fn default_generator_min_pitch() -> u8 {
    GENERATOR_MIN_PITCH
}

fn default_generator_pitch_count() -> usize {
    GENERATOR_PITCH_COUNT
}

fn default_latent_size() -> usize {
    LATENT_SIZE
}

fn default_min_pitch() -> u8 {
    MIN_PITCH
}

fn default_max_pitch() -> u8 {
    MAX_PITCH
}

fn default_time_stretch() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineConfig {
    pub midi: PathBuf,
    pub output: PathBuf,
    /// Also write the filtered, stretched notes as a MIDI file
    #[serde(default)]
    pub midi_output: Option<PathBuf>,
    #[serde(default = "default_min_pitch")]
    pub min_pitch: u8,
    #[serde(default = "default_max_pitch")]
    pub max_pitch: u8,
    #[serde(default = "default_time_stretch")]
    pub time_stretch: f64,
    pub renderer: RendererConfig,
    #[serde(default)]
    pub compositor: CompositorConfig,
}

impl PipelineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_bank_config_uses_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            midi = "riff.mid"
            output = "clip.wav"
            time_stretch = 1.3

            [renderer]
            kind = "sample_bank"
            directory = "bank"
            "#,
        )
        .unwrap();

        assert_eq!(config.min_pitch, 36);
        assert_eq!(config.max_pitch, 84);
        assert_eq!(config.time_stretch, 1.3);
        assert_eq!(config.midi_output, None);
        assert_eq!(config.compositor, CompositorConfig::default());
        assert_eq!(
            config.renderer,
            RendererConfig::SampleBank { directory: PathBuf::from("bank") }
        );
    }

    #[test]
    fn onnx_config_overrides_compositor() {
        let config = PipelineConfig::from_toml_str(
            r#"
            midi = "bach.mid"
            output = "clip.wav"

            [renderer]
            kind = "onnx"
            model = "generator.onnx"
            latent = [0.5, -0.5]
            latent_size = 2

            [compositor]
            release = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.compositor.release, 0.5);
        assert_eq!(config.compositor.sample_rate, 16000);
        match config.renderer {
            RendererConfig::Onnx { latent, latent_input, pitch_count, latent_size, .. } => {
                assert_eq!(latent, vec![0.5, -0.5]);
                assert_eq!(latent_input, "z");
                assert_eq!(pitch_count, 61);
                assert_eq!(latent_size, 2);
            }
            other => panic!("unexpected renderer {:?}", other),
        }
    }

    #[test]
    fn missing_renderer_is_an_error() {
        let result = PipelineConfig::from_toml_str("midi = \"a.mid\"\noutput = \"b.wav\"\n");
        assert!(result.is_err());
    }
}
