use std::{collections::{HashMap, VecDeque}, fs, path::Path};

use log::{debug, info, warn};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::constants::DEFAULT_TEMPO_MICROS;
use crate::error::Result;
use crate::note_events::NoteEvent;

#[derive(Debug, Clone, Copy)]
struct TempoChange {
    tick: u64,
    seconds: f64,
    micros_per_beat: u32,
}

/// Maps absolute ticks to seconds, following tempo changes for metrical files.
struct TempoMap {
    timing: Timing,
    changes: Vec<TempoChange>,
}

impl TempoMap {
    fn new(timing: Timing, mut tempo_events: Vec<(u64, u32)>) -> Self {
        tempo_events.sort_by_key(|&(tick, _)| tick);

        let ticks_per_beat = match timing {
            Timing::Metrical(tpb) => tpb.as_int().max(1) as f64,
            Timing::Timecode(..) => 1.0,
        };

        let mut changes = vec![TempoChange {
            tick: 0,
            seconds: 0.0,
            micros_per_beat: DEFAULT_TEMPO_MICROS,
        }];
        for (tick, micros_per_beat) in tempo_events {
            let Some(last) = changes.last_mut() else { break };
            if tick == last.tick {
                last.micros_per_beat = micros_per_beat;
                continue;
            }
            let seconds = last.seconds
                + (tick - last.tick) as f64 * last.micros_per_beat as f64 / 1e6 / ticks_per_beat;
            changes.push(TempoChange { tick, seconds, micros_per_beat });
        }

        Self { timing, changes }
    }

    fn seconds(&self, tick: u64) -> f64 {
        match self.timing {
            Timing::Metrical(tpb) => {
                let ticks_per_beat = tpb.as_int().max(1) as f64;
                let idx = self.changes.partition_point(|c| c.tick <= tick).saturating_sub(1);
                let change = self.changes[idx];
                change.seconds
                    + (tick - change.tick) as f64 * change.micros_per_beat as f64 / 1e6 / ticks_per_beat
            }
            Timing::Timecode(fps, subframes) => {
                tick as f64 / (fps.as_f32() as f64 * subframes.max(1) as f64)
            }
        }
    }
}

/// Extract notes from Standard MIDI File data.
///
/// A NoteOn with velocity 0 ends a note. Repeated NoteOns on the same key are
/// closed first-in first-out. Notes never released end at the last event of
/// the file.
///
/// # Arguments
///
/// * `data` - Raw SMF bytes.
/// * `min_pitch` - Lowest pitch to keep.
/// * `max_pitch` - Highest pitch to keep.
///
/// # Returns
///
/// * Notes sorted by start time, then pitch.
pub fn read_midi_notes(data: &[u8], min_pitch: u8, max_pitch: u8) -> Result<Vec<NoteEvent>> {
    let smf = Smf::parse(data)?;

    let mut tempo_events = vec![];
    let mut last_tick = 0u64;
    for track in smf.tracks.iter() {
        let mut tick = 0u64;
        for event in track.iter() {
            tick += event.delta.as_int() as u64;
            if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = event.kind {
                tempo_events.push((tick, tempo.as_int()));
            }
        }
        last_tick = last_tick.max(tick);
    }
    let tempo_map = TempoMap::new(smf.header.timing, tempo_events);

    // (start_tick, end_tick, pitch, velocity)
    let mut note_ticks: Vec<(u64, u64, u8, u8)> = vec![];
    for track in smf.tracks.iter() {
        let mut tick = 0u64;
        let mut sounding: HashMap<(u8, u8), VecDeque<(u64, u8)>> = HashMap::new();

        for event in track.iter() {
            tick += event.delta.as_int() as u64;
            let TrackEventKind::Midi { channel, message } = event.kind else {
                continue;
            };
            let channel = channel.as_int();

            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    sounding
                        .entry((channel, key.as_int()))
                        .or_default()
                        .push_back((tick, vel.as_int()));
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    let started = sounding
                        .get_mut(&(channel, key.as_int()))
                        .and_then(|queue| queue.pop_front());
                    match started {
                        Some((start_tick, vel)) => note_ticks.push((start_tick, tick, key.as_int(), vel)),
                        None => debug!("note off without note on for key {} at tick {}", key.as_int(), tick),
                    }
                }
                _ => {}
            }
        }

        for ((_, key), queue) in sounding {
            for (start_tick, vel) in queue {
                warn!("note {} at tick {} never released, ending at tick {}", key, start_tick, last_tick);
                note_ticks.push((start_tick, last_tick, key, vel));
            }
        }
    }

    let total = note_ticks.len();
    let mut notes: Vec<NoteEvent> = note_ticks
        .into_iter()
        .filter(|&(_, _, pitch, _)| pitch >= min_pitch && pitch <= max_pitch)
        .map(|(start_tick, end_tick, pitch, velocity)| NoteEvent {
            pitch,
            velocity,
            start_time: tempo_map.seconds(start_tick),
            end_time: tempo_map.seconds(end_tick),
        })
        .collect();

    notes.sort_by(|a, b| {
        a.start_time
            .total_cmp(&b.start_time)
            .then(a.pitch.cmp(&b.pitch))
    });

    if notes.len() < total {
        debug!(
            "dropped {} notes outside pitch range {}..={}",
            total - notes.len(),
            min_pitch,
            max_pitch
        );
    }

    Ok(notes)
}

/// Load a MIDI file as a list of notes within `[min_pitch, max_pitch]`.
pub fn load_midi<P: AsRef<Path>>(midi_path: P, min_pitch: u8, max_pitch: u8) -> Result<Vec<NoteEvent>> {
    let midi_path = midi_path.as_ref();
    let data = fs::read(midi_path)?;
    let notes = read_midi_notes(&data, min_pitch, max_pitch)?;
    info!("loaded {} notes from {}", notes.len(), midi_path.display());
    Ok(notes)
}
