#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub pitch: u8,
    pub velocity: u8,
    pub start_time: f64,
    pub end_time: f64,
}

impl NoteEvent {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Scale note timing by a constant factor, e.g. 1.3 to play 30% slower.
///
/// # Arguments
///
/// * `notes` - Notes to stretch in place.
/// * `factor` - Multiplier applied to both start and end times.
pub fn stretch_notes(notes: &mut [NoteEvent], factor: f64) {
    for note in notes.iter_mut() {
        note.start_time *= factor;
        note.end_time *= factor;
    }
}

pub fn start_times(notes: &[NoteEvent]) -> Vec<f64> {
    notes.iter().map(|n| n.start_time).collect()
}

pub fn end_times(notes: &[NoteEvent]) -> Vec<f64> {
    notes.iter().map(|n| n.end_time).collect()
}

pub fn velocities(notes: &[NoteEvent]) -> Vec<u8> {
    notes.iter().map(|n| n.velocity).collect()
}
