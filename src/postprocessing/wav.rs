use std::{io::{Seek, Write}, path::Path};

use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;
use ndarray::Array1;

use crate::error::Result;

fn pcm_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn write_samples<W: Write + Seek>(mut wav_writer: WavWriter<W>, audio: &Array1<f32>) -> Result<()> {
    for &sample in audio.iter() {
        wav_writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)?;
    }
    wav_writer.finalize()?;
    Ok(())
}

/// Encode a mono clip as 16-bit PCM. Samples are clamped to [-1.0, 1.0].
pub fn write_wav<W: Write + Seek>(writer: W, audio: &Array1<f32>, sample_rate: u32) -> Result<()> {
    write_samples(WavWriter::new(writer, pcm_spec(sample_rate))?, audio)
}

pub fn save_wav<P: AsRef<Path>>(audio: &Array1<f32>, path: P, sample_rate: u32) -> Result<()> {
    let path = path.as_ref();
    write_samples(WavWriter::create(path, pcm_spec(sample_rate))?, audio)?;
    info!(
        "wrote {:.2}s of audio to {}",
        audio.len() as f64 / sample_rate as f64,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;
    use std::io::Cursor;

    #[test]
    fn clip_is_written_as_mono_pcm16() {
        let audio = Array1::from(vec![0.0, 0.5, -0.5, 1.5, -2.0]);
        let mut buffer = Cursor::new(Vec::new());
        write_wav(&mut buffer, &audio, 16000).unwrap();

        buffer.set_position(0);
        let reader = WavReader::new(buffer).unwrap();
        assert_eq!(reader.spec(), pcm_spec(16000));

        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16384, -16384, i16::MAX, -i16::MAX]);
    }

    #[test]
    fn saved_file_has_clip_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated_clip.wav");
        let audio = Array1::<f32>::zeros(48000);

        save_wav(&audio, &path, 16000).unwrap();

        let reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.duration(), 48000);
        assert_eq!(reader.spec().sample_rate, 16000);
    }
}
