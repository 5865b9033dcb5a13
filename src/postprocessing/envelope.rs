use ndarray::{s, Array1};

use crate::config::CompositorConfig;

/// Create an attack-sustain-release amplitude envelope.
///
/// The attack ramp overlaps the start of the sustain, so only the release
/// adds to the sound length. When the attack is longer than the sustain the
/// release ramp is written last and wins.
///
/// # Arguments
///
/// * `note_length` - Note duration in seconds, capped at `config.max_note_length`.
/// * `config` - Attack, release and sample rate.
///
/// # Returns
///
/// * Per-sample gains of length `round(sr * note_length) + round(sr * release)`.
pub fn get_envelope(note_length: f64, config: &CompositorConfig) -> Array1<f32> {
    let sample_rate = config.sample_rate as f64;
    let note_length = note_length.min(config.max_note_length).max(0.0);

    let i_attack = (sample_rate * config.attack).round() as usize;
    let i_sustain = (sample_rate * note_length).round() as usize;
    let i_release = (sample_rate * config.release).round() as usize;
    let i_total = i_sustain + i_release;

    let mut envelope = Array1::<f32>::ones(i_total);

    let attack = Array1::linspace(0.0, 1.0, i_attack);
    let attack_end = i_attack.min(i_total);
    envelope
        .slice_mut(s![..attack_end])
        .assign(&attack.slice(s![..attack_end]));

    let release = Array1::linspace(1.0, 0.0, i_release);
    envelope.slice_mut(s![i_sustain..]).assign(&release);

    envelope
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn config_at(sample_rate: u32) -> CompositorConfig {
        CompositorConfig { sample_rate, ..Default::default() }
    }

    #[test]
    fn one_second_note_at_16k() {
        let envelope = get_envelope(1.0, &CompositorConfig::default());

        assert_eq!(envelope.len(), 16000 + 4800);
        assert_eq!(envelope[0], 0.0);
        assert_relative_eq!(envelope[80], 80.0 / 159.0, epsilon = 1e-6);
        assert_relative_eq!(envelope[159], 1.0, epsilon = 1e-6);
        assert_eq!(envelope[160], 1.0);
        assert_eq!(envelope[15999], 1.0);
        assert_eq!(envelope[16000], 1.0);
        assert_relative_eq!(envelope[16000 + 2400], 1.0 - 2400.0 / 4799.0, epsilon = 1e-6);
        assert_abs_diff_eq!(envelope[16000 + 4799], 0.0, epsilon = 1e-6);
        assert!(envelope.iter().all(|&g| (-1e-6..=1.0 + 1e-6).contains(&g)));
    }

    #[test]
    fn zero_length_note_is_pure_release() {
        let envelope = get_envelope(0.0, &CompositorConfig::default());

        assert_eq!(envelope.len(), 4800);
        assert_eq!(envelope[0], 1.0);
        assert_abs_diff_eq!(envelope[4799], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn negative_length_is_treated_as_zero() {
        let envelope = get_envelope(-0.25, &config_at(100));
        assert_eq!(envelope.len(), 30);
        assert_eq!(envelope[0], 1.0);
    }

    #[test]
    fn sustain_is_capped() {
        let envelope = get_envelope(10.0, &config_at(100));
        assert_eq!(envelope.len(), 300 + 30);
        assert_eq!(envelope[299], 1.0);
        assert_eq!(envelope[300], 1.0);
        assert_abs_diff_eq!(envelope[329], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn release_overwrites_long_attack() {
        let config = CompositorConfig { sample_rate: 100, attack: 0.5, ..Default::default() };
        let envelope = get_envelope(0.1, &config);

        assert_eq!(envelope.len(), 10 + 30);
        assert_relative_eq!(envelope[5], 5.0 / 49.0, epsilon = 1e-6);
        assert_relative_eq!(envelope[9], 9.0 / 49.0, epsilon = 1e-6);
        assert_eq!(envelope[10], 1.0);
        assert_relative_eq!(envelope[20], 1.0 - 10.0 / 29.0, epsilon = 1e-6);
        assert_abs_diff_eq!(envelope[39], 0.0, epsilon = 1e-6);
    }
}
