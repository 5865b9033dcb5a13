use log::{debug, info};
use ndarray::Array1;

use crate::error::Result;
use crate::note_events::NoteEvent;

/// Produces the audio of a single note.
pub trait Renderer {
    /// Sample rate of the audio returned by `render`.
    fn sample_rate(&self) -> u32;

    /// Render one note at `pitch` with the timbre described by `latent`.
    /// Backends without a latent space ignore it.
    fn render(&mut self, pitch: u8, latent: &[f32]) -> Result<Array1<f32>>;
}

/// Render every note with the same latent vector, keeping the timbre
/// constant over the whole performance.
pub fn render_notes<R: Renderer + ?Sized>(
    renderer: &mut R,
    notes: &[NoteEvent],
    latent: &[f32],
) -> Result<Vec<Array1<f32>>> {
    info!("generating {} samples", notes.len());
    notes
        .iter()
        .enumerate()
        .map(|(i, note)| {
            debug!("note {}: pitch {} at {:.3}s", i, note.pitch, note.start_time);
            renderer.render(note.pitch, latent)
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Sine at the note's pitch, fixed length, latent ignored.
    pub struct SineRenderer {
        pub sample_rate: u32,
        pub length: usize,
        pub calls: Vec<u8>,
    }

    impl SineRenderer {
        pub fn new(sample_rate: u32, length: usize) -> Self {
            Self { sample_rate, length, calls: vec![] }
        }
    }

    impl Renderer for SineRenderer {
        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn render(&mut self, pitch: u8, _latent: &[f32]) -> Result<Array1<f32>> {
            self.calls.push(pitch);
            let hz = 440.0 * 2.0f32.powf((pitch as f32 - 69.0) / 12.0);
            let sample_rate = self.sample_rate as f32;
            Ok(Array1::from_iter((0..self.length).map(|i| {
                (2.0 * std::f32::consts::PI * hz * i as f32 / sample_rate).sin() * 0.8
            })))
        }
    }
}
