use std::{collections::HashMap, path::PathBuf};

use log::debug;
use ndarray::Array1;

use crate::error::{CompositorError, Result};
use crate::preprocessing::load_audio::load_and_convert_audio;

use super::renderer::Renderer;

/// Renders notes from a directory of pre-recorded `<pitch>.wav` files.
///
/// Files are loaded on first use and converted to mono at the bank's
/// sample rate.
pub struct SampleBankRenderer {
    directory: PathBuf,
    sample_rate: u32,
    cache: HashMap<u8, Array1<f32>>,
}

impl SampleBankRenderer {
    pub fn new<P: Into<PathBuf>>(directory: P, sample_rate: u32) -> Self {
        Self {
            directory: directory.into(),
            sample_rate,
            cache: HashMap::new(),
        }
    }

    fn sample_path(&self, pitch: u8) -> PathBuf {
        self.directory.join(format!("{}.wav", pitch))
    }
}

impl Renderer for SampleBankRenderer {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn render(&mut self, pitch: u8, _latent: &[f32]) -> Result<Array1<f32>> {
        if let Some(audio) = self.cache.get(&pitch) {
            return Ok(audio.clone());
        }

        let path = self.sample_path(pitch);
        if !path.is_file() {
            return Err(CompositorError::MissingSample(pitch));
        }

        debug!("loading sample {}", path.display());
        let audio = load_and_convert_audio(&path, self.sample_rate)?;
        self.cache.insert(pitch, audio.clone());
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_constant(path: PathBuf, sample_rate: u32, len: usize, value: i16) {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..len {
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn loads_and_caches_by_pitch() {
        let dir = tempfile::tempdir().unwrap();
        write_constant(dir.path().join("60.wav"), 16000, 1000, i16::MAX);

        let mut renderer = SampleBankRenderer::new(dir.path(), 16000);
        let first = renderer.render(60, &[]).unwrap();
        assert_eq!(first.len(), 1000);
        assert_eq!(first[10], 1.0);

        std::fs::remove_file(dir.path().join("60.wav")).unwrap();
        let cached = renderer.render(60, &[0.1, 0.2]).unwrap();
        assert_eq!(cached, first);
    }

    #[test]
    fn missing_pitch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = SampleBankRenderer::new(dir.path(), 16000);

        assert!(matches!(renderer.render(61, &[]), Err(CompositorError::MissingSample(61))));
    }
}
