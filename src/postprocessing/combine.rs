use log::{debug, warn};
use ndarray::{s, Array1};

use crate::config::CompositorConfig;
use crate::constants::MAX_VELOCITY;
use crate::error::{CompositorError, Result};
use crate::note_events::{end_times, start_times, velocities, NoteEvent};

use super::envelope::get_envelope;

/// Largest absolute sample value, 0.0 for an empty buffer.
pub fn peak_amplitude(audio: &Array1<f32>) -> f32 {
    audio.fold(0.0_f32, |peak, &x| peak.max(x.abs()))
}

/// Scale `audio` so its peak absolute value becomes `target`.
/// Silent buffers are left untouched.
///
/// # Returns
///
/// * The peak before scaling.
pub fn normalize_peak(audio: &mut Array1<f32>, target: f32) -> f32 {
    let peak = peak_amplitude(audio);
    if peak > 0.0 {
        audio.mapv_inplace(|x| x / peak * target);
    }
    peak
}

/// Number of samples in the output clip.
///
/// The last note end plus the tail is truncated to whole seconds before
/// converting to samples.
pub fn clip_length(end_times: &[f64], config: &CompositorConfig) -> usize {
    let last_end = end_times.iter().copied().fold(0.0, f64::max);
    let seconds = (last_end + config.tail).floor().max(0.0) as usize;
    seconds * config.sample_rate as usize
}

/// Apply the envelope, per-note normalization and velocity gain to one note.
///
/// # Arguments
///
/// * `index` - Position of the note in the input, used for error reporting.
/// * `audio` - Rendered note audio, at least as long as the envelope.
/// * `note_length` - Note duration in seconds.
/// * `velocity` - MIDI velocity.
/// * `config` - Envelope parameters.
///
/// # Returns
///
/// * The shaped note, one sample per envelope gain.
pub fn shape_note(
    index: usize,
    audio: &Array1<f32>,
    note_length: f64,
    velocity: u8,
    config: &CompositorConfig,
) -> Result<Array1<f32>> {
    let envelope = get_envelope(note_length, config);
    let length = envelope.len();
    if audio.len() < length {
        return Err(CompositorError::UndersizedNoteAudio {
            index,
            needed: length,
            available: audio.len(),
        });
    }

    let mut note = &audio.slice(s![..length]) * &envelope;
    if normalize_peak(&mut note, 1.0) == 0.0 {
        debug!("note {} is silent", index);
    }
    note *= velocity as f32 / MAX_VELOCITY;

    Ok(note)
}

/// Overlap-add every shaped note into a fresh clip, without the final
/// normalization.
///
/// # Arguments
///
/// * `audio_notes` - Rendered audio, one buffer per note.
/// * `start_times` - Note starts in seconds.
/// * `end_times` - Note ends in seconds.
/// * `velocities` - MIDI velocities.
/// * `config` - Sample rate, envelope and tail parameters.
///
/// # Returns
///
/// * The summed clip of `clip_length(end_times)` samples.
pub fn mix_notes(
    audio_notes: &[Array1<f32>],
    start_times: &[f64],
    end_times: &[f64],
    velocities: &[u8],
    config: &CompositorConfig,
) -> Result<Array1<f32>> {
    let n_notes = audio_notes.len();
    if start_times.len() != n_notes || end_times.len() != n_notes || velocities.len() != n_notes {
        return Err(CompositorError::LengthMismatch {
            audio: n_notes,
            start_times: start_times.len(),
            end_times: end_times.len(),
            velocities: velocities.len(),
        });
    }

    let mut audio_clip = Array1::<f32>::zeros(clip_length(end_times, config));
    let sample_rate = config.sample_rate as f64;

    for (i, audio) in audio_notes.iter().enumerate() {
        let (t_start, t_end, vel) = (start_times[i], end_times[i], velocities[i]);
        let note = shape_note(i, audio, t_end - t_start, vel, config)?;

        let clip_start = (t_start * sample_rate).floor().max(0.0) as usize;
        let clip_end = (clip_start + note.len()).min(audio_clip.len());
        if clip_start >= clip_end {
            warn!("note {} starts at {:.3}s, past the end of the clip", i, t_start);
            continue;
        }

        let placed = clip_end - clip_start;
        if placed < note.len() {
            warn!("note {} truncated by {} samples at the clip end", i, note.len() - placed);
        }

        let mut target = audio_clip.slice_mut(s![clip_start..clip_end]);
        target += &note.slice(s![..placed]);
    }

    Ok(audio_clip)
}

/// Normalize the mixed clip to its peak, then scale by `headroom`.
/// A silent clip stays silent.
pub fn normalize_clip(audio_clip: &mut Array1<f32>, headroom: f32) {
    if normalize_peak(audio_clip, headroom) == 0.0 {
        warn!("clip is silent, skipping normalization");
    }
}

/// Combine audio from multiple notes into a single normalized clip.
///
/// # Arguments
///
/// * `audio_notes` - Rendered audio, one buffer per note.
/// * `start_times` - Note starts in seconds.
/// * `end_times` - Note ends in seconds.
/// * `velocities` - MIDI velocities.
/// * `config` - Compositing parameters.
///
/// # Returns
///
/// * The combined clip with peak absolute amplitude `config.headroom`, or all zeros.
pub fn combine_notes(
    audio_notes: &[Array1<f32>],
    start_times: &[f64],
    end_times: &[f64],
    velocities: &[u8],
    config: &CompositorConfig,
) -> Result<Array1<f32>> {
    let mut audio_clip = mix_notes(audio_notes, start_times, end_times, velocities, config)?;
    normalize_clip(&mut audio_clip, config.headroom);
    Ok(audio_clip)
}

pub fn combine_note_events(
    audio_notes: &[Array1<f32>],
    notes: &[NoteEvent],
    config: &CompositorConfig,
) -> Result<Array1<f32>> {
    combine_notes(
        audio_notes,
        &start_times(notes),
        &end_times(notes),
        &velocities(notes),
        config,
    )
}
