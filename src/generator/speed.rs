use super::GeneratorConfig;
use crate::model::track::{PlacedNote, REFERENCE_FPS};
use log::debug;

/// Derives the scroll speed from the median gap between consecutive notes, ignoring chords.
/// Falls back to `default_speed` when no gap is wider than the chord threshold.
pub fn calibrate_speed(notes: &[PlacedNote], config: &GeneratorConfig) -> f64 {
    let mut intervals: Vec<f64> = notes
        .windows(2)
        .map(|pair| pair[1].time_seconds - pair[0].time_seconds)
        .filter(|&interval| interval > config.chord_threshold_seconds)
        .collect();

    if intervals.is_empty() {
        debug!(
            "No usable note intervals, keeping default speed {:.3}",
            config.default_speed
        );
        return config.default_speed;
    }

    intervals.sort_by(f64::total_cmp);
    let median = intervals[intervals.len() / 2];
    let calculated = config.target_distance / (median * REFERENCE_FPS);
    let speed = calculated.clamp(config.min_speed, config.max_speed);

    debug!(
        "Speed calibration: median interval {:.3}s, calculated {:.3}, base speed {:.3}",
        median, calculated, speed
    );

    speed
}

#[cfg(test)]
mod test {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9
    }

    fn spaced(spacing: f64, count: usize) -> Vec<PlacedNote> {
        (0..count)
            .map(|i| PlacedNote {
                start_tick: i as u32,
                duration_ticks: 1,
                pitch: 60,
                velocity: 100,
                time_seconds: i as f64 * spacing,
                duration_seconds: spacing / 2.0,
                lane: 0,
                is_tall: false,
                triggered: false,
                collided: false,
            })
            .collect()
    }

    #[test]
    fn fast_tracks_clamp_to_max() {
        assert_eq!(calibrate_speed(&spaced(0.05, 40), &GeneratorConfig::default()), 0.6);
    }

    #[test]
    fn slow_tracks_clamp_to_min() {
        assert_eq!(calibrate_speed(&spaced(5.0, 10), &GeneratorConfig::default()), 0.08);
    }

    #[test]
    fn median_interval_drives_speed() {
        // 4 / (0.25 * 60)
        let speed = calibrate_speed(&spaced(0.25, 16), &GeneratorConfig::default());
        assert!(approx_eq(speed, 4.0 / 15.0));
    }

    #[test]
    fn chords_are_ignored() {
        let mut notes = spaced(0.5, 8);
        let mut chords = notes.clone();
        for note in chords.iter_mut() {
            note.time_seconds += 0.005;
        }
        notes.extend(chords);
        notes.sort_by(|a, b| a.time_seconds.total_cmp(&b.time_seconds));

        let speed = calibrate_speed(&notes, &GeneratorConfig::default());
        // only the 0.495s gaps between chords count
        assert!(approx_eq(speed, 4.0 / (0.495 * 60.0)));
    }

    #[test]
    fn no_intervals_keeps_default() {
        let config = GeneratorConfig::default();
        assert_eq!(calibrate_speed(&[], &config), 0.15);
        assert_eq!(calibrate_speed(&spaced(0.0, 5), &config), 0.15);
    }
}
