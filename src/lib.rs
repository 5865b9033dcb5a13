pub mod config;
pub mod constants;
pub mod error;
pub mod note_events;
pub mod pipeline;
pub mod preprocessing {
    pub mod load_audio;
    pub mod load_midi;
}
pub mod synthesis {
    pub mod onnx;
    pub mod renderer;
    pub mod sample_bank;
}
pub mod postprocessing {
    pub mod combine;
    pub mod envelope;
    pub mod midi;
    pub mod wav;
}

pub use config::{CompositorConfig, PipelineConfig, RendererConfig};
pub use error::{CompositorError, Result};
pub use note_events::NoteEvent;
pub use postprocessing::combine::{combine_note_events, combine_notes};
pub use postprocessing::envelope::get_envelope;
pub use synthesis::renderer::Renderer;
