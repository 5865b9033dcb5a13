use std::path::Path;

use hound::{SampleFormat, WavReader};
use log::debug;
use ndarray::Array1;
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

use crate::error::{CompositorError, Result};

fn read_mono_samples<P: AsRef<Path>>(path: P) -> Result<(Vec<f64>, u32)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(CompositorError::UnsupportedChannels(spec.channels));
    }

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let max_sample_value = 2.0_f64.powi(spec.bits_per_sample as i32 - 1) - 1.0;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_sample_value))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    // Mix down to mono
    let channels = spec.channels as usize;
    let samples = interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect();

    Ok((samples, spec.sample_rate))
}

fn resample(samples: Vec<f64>, source_rate: u32, target_rate: u32) -> Result<Vec<f64>> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let resample_ratio = target_rate as f64 / source_rate as f64;
    let expected_len = (samples.len() as f64 * resample_ratio).round() as usize;

    let mut resampler = SincFixedIn::<f64>::new(resample_ratio, 2.0, params, samples.len(), 1)?;
    let delay = resampler.output_delay();

    let channel_data = vec![samples];
    let mut resampled = resampler.process(&channel_data, None)?.remove(0);
    // Flush the filter so the delayed tail comes out too
    resampled.extend(resampler.process_partial(None::<&[Vec<f64>]>, None)?.remove(0));

    Ok(resampled.into_iter().skip(delay).take(expected_len).collect())
}

/// Read a WAV file as mono f32 audio at `target_sample_rate`.
///
/// Integer PCM is scaled to [-1.0, 1.0], channels are averaged and the
/// result is resampled when the file rate differs from the target.
pub fn load_and_convert_audio<P: AsRef<Path>>(path: P, target_sample_rate: u32) -> Result<Array1<f32>> {
    let path = path.as_ref();
    let (samples, sample_rate) = read_mono_samples(path)?;

    let samples = if sample_rate == target_sample_rate || samples.is_empty() {
        samples
    } else {
        debug!("resampling {} from {} Hz to {} Hz", path.display(), sample_rate, target_sample_rate);
        resample(samples, sample_rate, target_sample_rate)?
    };

    Ok(samples.into_iter().map(|s| s as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_sine(path: &Path, sample_rate: u32, channels: u16, seconds: f64) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        let n = (sample_rate as f64 * seconds) as usize;
        for i in 0..n {
            let t = i as f64 / sample_rate as f64;
            let value = (0.5 * (2.0 * std::f64::consts::PI * 220.0 * t).sin() * i16::MAX as f64) as i16;
            for _ in 0..channels {
                writer.write_sample(value).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    fn peak(audio: &Array1<f32>) -> f32 {
        audio.fold(0.0_f32, |p, &x| p.max(x.abs()))
    }

    #[test]
    fn same_rate_stereo_is_mixed_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("60.wav");
        write_sine(&path, 16000, 2, 0.5);

        let audio = load_and_convert_audio(&path, 16000).unwrap();

        assert_eq!(audio.len(), 8000);
        assert!((peak(&audio) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn higher_rate_is_resampled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("64.wav");
        write_sine(&path, 32000, 1, 1.0);

        let audio = load_and_convert_audio(&path, 16000).unwrap();

        assert_eq!(audio.len(), 16000);
        let middle = audio.slice(ndarray::s![4000..12000]).to_owned();
        assert!((peak(&middle) - 0.5).abs() < 0.05);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_and_convert_audio(dir.path().join("nope.wav"), 16000).is_err());
    }
}
