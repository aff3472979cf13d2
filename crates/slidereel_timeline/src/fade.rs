// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fade envelope for audio blocks.

/// Volume multiplier at `time` seconds into a block of `duration` seconds.
///
/// Linear ramps: up over the first `fade_in` seconds, down over the last
/// `fade_out` seconds. When the two windows overlap the fade-in is checked
/// first and wins.
pub fn volume_multiplier(time: f64, duration: f64, fade_in: f64, fade_out: f64) -> f64 {
    if fade_in > 0.0 && time < fade_in {
        time / fade_in
    } else if fade_out > 0.0 && time > duration - fade_out {
        (duration - time) / fade_out
    } else {
        1.0
    }
}

/// Output volume (0..1) for a 0-100 base volume and a multiplier
pub fn applied_volume(base_volume: f32, multiplier: f64) -> f32 {
    ((f64::from(base_volume) / 100.0) * multiplier).clamp(0.0, 1.0) as f32
}

/// Output volume of an audio block at `time` seconds into it
pub fn faded_volume(base_volume: f32, time: f64, duration: f64, fade_in: f64, fade_out: f64) -> f32 {
    applied_volume(base_volume, volume_multiplier(time, duration, fade_in, fade_out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_points() {
        assert_eq!(volume_multiplier(0.0, 10.0, 2.0, 2.0), 0.0);
        assert_eq!(volume_multiplier(1.0, 10.0, 2.0, 2.0), 0.5);
        assert_eq!(volume_multiplier(5.0, 10.0, 2.0, 2.0), 1.0);
        assert_eq!(volume_multiplier(9.0, 10.0, 2.0, 2.0), 0.5);
        assert_eq!(volume_multiplier(10.0, 10.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn test_no_fades() {
        assert_eq!(volume_multiplier(0.0, 10.0, 0.0, 0.0), 1.0);
        assert_eq!(volume_multiplier(10.0, 10.0, 0.0, 0.0), 1.0);
    }

    #[test]
    fn test_fade_in_wins_on_overlap() {
        // windows overlap on a 3s block with 2s fades
        assert_eq!(volume_multiplier(1.5, 3.0, 2.0, 2.0), 0.75);
    }

    #[test]
    fn test_applied_volume_clamped() {
        assert_eq!(applied_volume(50.0, 0.5), 0.25);
        assert_eq!(applied_volume(100.0, 1.0), 1.0);
        // outside the block the multiplier may go negative
        assert_eq!(applied_volume(100.0, -0.5), 0.0);
        assert_eq!(faded_volume(80.0, 1.0, 10.0, 2.0, 0.0), 0.4);
    }
}
