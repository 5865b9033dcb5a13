use std::{fs, path::Path};

use log::info;
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};

use crate::constants::TICKS_PER_BEAT;
use crate::error::Result;
use crate::note_events::NoteEvent;

#[derive(Debug, Clone)]
struct TrackEventAbsolute<'a> {
    tick: u32,
    kind: TrackEventKind<'a>,
}

fn is_note_on(kind: &TrackEventKind) -> bool {
    matches!(kind, TrackEventKind::Midi { message: MidiMessage::NoteOn { .. }, .. })
}

pub fn generate_ordered_midi_events(notes: &[NoteEvent], ticks_per_second: f64) -> Vec<TrackEvent<'static>> {
    let mut track_events_absolute: Vec<TrackEventAbsolute> = vec![];
    for note in notes {
        let start_tick = (note.start_time.max(0.0) * ticks_per_second).round() as u32;
        let end_tick = ((note.end_time.max(0.0) * ticks_per_second).round() as u32).max(start_tick);

        track_events_absolute.push(TrackEventAbsolute {
            tick: start_tick,
            kind: TrackEventKind::Midi {
                channel: 0.into(),
                message: MidiMessage::NoteOn {
                    key: note.pitch.into(),
                    vel: note.velocity.max(1).into(),
                },
            },
        });

        track_events_absolute.push(TrackEventAbsolute {
            tick: end_tick,
            kind: TrackEventKind::Midi {
                channel: 0.into(),
                message: MidiMessage::NoteOff {
                    key: note.pitch.into(),
                    vel: 0.into(),
                },
            },
        });
    }

    // Note offs first so back-to-back notes on one key don't overlap
    track_events_absolute.sort_by_key(|event| (event.tick, is_note_on(&event.kind)));

    let mut track_events = vec![];
    let mut previous_tick = 0;
    for track_event_absolute in track_events_absolute {
        track_events.push(TrackEvent {
            delta: (track_event_absolute.tick - previous_tick).into(),
            kind: track_event_absolute.kind,
        });
        previous_tick = track_event_absolute.tick;
    }

    track_events
}

/// Generate MIDI file data from note events.
///
/// # Arguments
///
/// * `notes` - List of time-based note events.
/// * `beats_per_minute` - Tempo written to the file.
///
/// # Returns
///
/// * A vector of bytes representing the MIDI file.
pub fn generate_midi_file_data(notes: &[NoteEvent], beats_per_minute: u32) -> Result<Vec<u8>> {
    let beats_per_minute = beats_per_minute.max(1);
    let timing = Timing::Metrical(TICKS_PER_BEAT.into());
    let ticks_per_second = TICKS_PER_BEAT as f64 * beats_per_minute as f64 / 60.0;

    let mut smf = Smf::new(Header {
        format: Format::SingleTrack,
        timing,
    });
    let mut track = Track::new();

    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo((60_000_000 / beats_per_minute).into())),
    });
    track.extend(generate_ordered_midi_events(notes, ticks_per_second));
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    smf.tracks.push(track);

    let mut buffer = Vec::new();
    smf.write_std(&mut buffer)?;

    Ok(buffer)
}

pub fn save_midi<P: AsRef<Path>>(notes: &[NoteEvent], path: P, beats_per_minute: u32) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, generate_midi_file_data(notes, beats_per_minute)?)?;
    info!("wrote {} notes to {}", notes.len(), path.display());
    Ok(())
}
