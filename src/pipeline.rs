//! MIDI file in, composited WAV out

use log::info;
use ndarray::Array1;

use crate::config::{CompositorConfig, PipelineConfig, RendererConfig};
use crate::error::{CompositorError, Result};
use crate::note_events::{stretch_notes, NoteEvent};
use crate::postprocessing::{combine::combine_note_events, midi::save_midi, wav::save_wav};
use crate::preprocessing::load_midi::load_midi;
use crate::synthesis::{
    onnx::{GeneratorSignature, OnnxRenderer},
    renderer::{render_notes, Renderer},
    sample_bank::SampleBankRenderer,
};

const EXPORT_BEATS_PER_MINUTE: u32 = 120;

/// Build the configured renderer along with the latent vector to render with.
pub fn build_renderer(config: &RendererConfig, sample_rate: u32) -> Result<(Box<dyn Renderer>, Vec<f32>)> {
    match config {
        RendererConfig::SampleBank { directory } => {
            let renderer: Box<dyn Renderer> = Box::new(SampleBankRenderer::new(directory.clone(), sample_rate));
            Ok((renderer, vec![]))
        }
        RendererConfig::Onnx {
            model,
            latent,
            latent_input,
            pitch_input,
            audio_output,
            min_pitch,
            pitch_count,
            latent_size,
        } => {
            let signature = GeneratorSignature {
                latent_input: latent_input.clone(),
                pitch_input: pitch_input.clone(),
                audio_output: audio_output.clone(),
                min_pitch: *min_pitch,
                pitch_count: *pitch_count,
                latent_size: *latent_size,
            };
            let renderer: Box<dyn Renderer> = Box::new(OnnxRenderer::new(model, signature, sample_rate)?);
            Ok((renderer, latent.clone()))
        }
    }
}

/// Render each note and composite them into one clip.
pub fn render_performance<R: Renderer + ?Sized>(
    renderer: &mut R,
    notes: &[NoteEvent],
    latent: &[f32],
    config: &CompositorConfig,
) -> Result<Array1<f32>> {
    if renderer.sample_rate() != config.sample_rate {
        return Err(CompositorError::SampleRateMismatch {
            renderer: renderer.sample_rate(),
            clip: config.sample_rate,
        });
    }

    let audio_notes = render_notes(renderer, notes, latent)?;
    combine_note_events(&audio_notes, notes, config)
}

pub fn run(config: &PipelineConfig) -> Result<Array1<f32>> {
    let mut notes = load_midi(&config.midi, config.min_pitch, config.max_pitch)?;
    if config.time_stretch != 1.0 {
        info!("stretching note times by {}", config.time_stretch);
        stretch_notes(&mut notes, config.time_stretch);
    }

    if let Some(midi_output) = &config.midi_output {
        save_midi(&notes, midi_output, EXPORT_BEATS_PER_MINUTE)?;
    }

    let compositor = &config.compositor;
    let (mut renderer, latent) = build_renderer(&config.renderer, compositor.sample_rate)?;
    let audio_clip = render_performance(renderer.as_mut(), &notes, &latent, compositor)?;

    save_wav(&audio_clip, &config.output, compositor.sample_rate)?;
    Ok(audio_clip)
}
