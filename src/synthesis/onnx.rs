use std::path::Path;

use log::info;
use ndarray::Array1;
use ort::{GraphOptimizationLevel, Session, Tensor};

use crate::error::{CompositorError, Result};

use super::renderer::Renderer;

/// One-hot pitch conditioning vector for a generator covering
/// `min_pitch..min_pitch + pitch_count`.
pub fn one_hot_pitch(pitch: u8, min_pitch: u8, pitch_count: usize) -> Result<Vec<f32>> {
    let max_pitch = (min_pitch as usize + pitch_count).saturating_sub(1).min(u8::MAX as usize) as u8;
    if pitch_count == 0 || pitch < min_pitch || pitch > max_pitch {
        return Err(CompositorError::PitchOutOfRange { pitch, min: min_pitch, max: max_pitch });
    }

    let mut one_hot = vec![0.0; pitch_count];
    one_hot[(pitch - min_pitch) as usize] = 1.0;
    Ok(one_hot)
}

/// Names and sizes of the exported generator's inputs and output.
#[derive(Debug, Clone)]
pub struct GeneratorSignature {
    pub latent_input: String,
    pub pitch_input: String,
    pub audio_output: String,
    pub min_pitch: u8,
    pub pitch_count: usize,
    pub latent_size: usize,
}

/// Renders notes with an exported generator graph taking a latent vector
/// `[1, latent_size]` and a one-hot pitch `[1, pitch_count]`.
pub struct OnnxRenderer {
    session: Session,
    signature: GeneratorSignature,
    sample_rate: u32,
}

impl OnnxRenderer {
    pub fn new<P: AsRef<Path>>(model_path: P, signature: GeneratorSignature, sample_rate: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(model_path)?;
        info!("loaded generator {}", model_path.display());

        Ok(Self {
            session,
            signature,
            sample_rate,
        })
    }
}

impl Renderer for OnnxRenderer {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn render(&mut self, pitch: u8, latent: &[f32]) -> Result<Array1<f32>> {
        let signature = &self.signature;
        if latent.len() != signature.latent_size {
            return Err(CompositorError::LatentSize {
                expected: signature.latent_size,
                actual: latent.len(),
            });
        }
        let pitch_data = one_hot_pitch(pitch, signature.min_pitch, signature.pitch_count)?;

        let latent_tensor = Tensor::from_array((vec![1i64, latent.len() as i64], latent.to_vec()))?;
        let pitch_tensor = Tensor::from_array((vec![1i64, pitch_data.len() as i64], pitch_data))?;

        let outputs = self.session.run(ort::inputs![
            signature.latent_input.as_str() => latent_tensor,
            signature.pitch_input.as_str() => pitch_tensor
        ]?)?;

        let (_, audio) = outputs
            .iter()
            .find(|(name, _)| **name == signature.audio_output)
            .ok_or_else(|| CompositorError::MissingOutput(signature.audio_output.clone()))?;

        // Batch of one: flatten [1, samples] (or [1, samples, 1]) to samples
        let audio = audio.try_extract_tensor::<f32>()?;
        Ok(audio.iter().copied().collect())
    }
}
