use super::{GeneratorConfig, pick_index, seeded_random};
use crate::model::track::PlacedNote;
use log::{debug, warn};

/// Sweeps overlapping windows over the track and folds notes off excess lanes so no window
/// starts out with more than `max_lanes` distinct lanes. Returns how many notes were moved.
///
/// The sweep is greedy and never revisits a window, so a note moved late in one window can
/// still leave a later window over the limit. `notes` must be sorted by `time_seconds`.
pub fn enforce_max_lanes(notes: &mut [PlacedNote], config: &GeneratorConfig) -> usize {
    let max_lanes = config.max_lanes.max(1) as usize;
    let width = config.window_seconds;
    let step = config.window_step_seconds;

    if step <= 0.0 || !step.is_finite() {
        warn!("Lane repair step must be positive, got {}, skipping repair..!", step);
        return 0;
    }

    let max_time = notes
        .iter()
        .map(|note| note.time_seconds)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut adjusted = 0;
    let mut t = 0.0;

    while t < max_time {
        let first = notes.partition_point(|note| note.time_seconds < t);
        let last = first + notes[first..].partition_point(|note| note.time_seconds < t + width);
        let in_window = first..last;

        let mut occupied: Vec<u8> = Vec::new();
        for note in notes[in_window.clone()].iter() {
            if !occupied.contains(&note.lane) {
                occupied.push(note.lane);
            }
        }

        if occupied.len() > max_lanes {
            let window_seed = (t * 1000.0).floor();
            occupied.sort_by(|a, b| {
                seeded_random(window_seed + *a as f64).total_cmp(&seeded_random(window_seed + *b as f64))
            });
            let (keep, _) = occupied.split_at(max_lanes);

            for note in notes[in_window].iter_mut() {
                if keep.contains(&note.lane) {
                    continue;
                }

                let seed = note.time_seconds * 10000.0 + note.lane as f64 * 100.0;
                let target = keep[pick_index(seeded_random(seed), keep.len())];
                debug!(
                    "Moving note at {:.3}s from lane {} to lane {}",
                    note.time_seconds, note.lane, target
                );
                note.lane = target;
                adjusted += 1;
            }
        }

        t += step;
    }

    debug!("Lane repair moved {} notes", adjusted);
    adjusted
}
