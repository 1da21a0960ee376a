use super::{GeneratorConfig, seeded_random};
use crate::model::track::PlacedNote;
use log::debug;

/// Share of `saturation` notes found strictly within `radius` seconds of `times[index]`,
/// the note itself included, clamped to 1.0. `times` must be sorted ascending.
pub fn local_density(times: &[f64], index: usize, radius: f64, saturation: u32) -> f64 {
    let current = times[index];
    let first = times[..index].partition_point(|&t| current - t >= radius);
    let last = index + times[index..].partition_point(|&t| t - current < radius);

    ((last - first) as f64 / saturation.max(1) as f64).min(1.0)
}

fn tall_probability(density: f64, config: &GeneratorConfig) -> f64 {
    config
        .tall_tiers
        .iter()
        .find(|(threshold, _)| density > *threshold)
        .map(|(_, probability)| *probability)
        .unwrap_or(config.sparse_tall_probability)
}

/// Flags tall obstacles, favouring sparse passages. Returns how many notes became tall.
pub fn assign_heights(notes: &mut [PlacedNote], config: &GeneratorConfig) -> usize {
    let times: Vec<f64> = notes.iter().map(|note| note.time_seconds).collect();
    let mut tall = 0;

    for (i, note) in notes.iter_mut().enumerate() {
        let density = local_density(
            &times,
            i,
            config.density_radius_seconds,
            config.density_saturation,
        );
        let seed = note.start_tick as f64 * 10000.0 + i as f64;

        note.is_tall = seeded_random(seed) < tall_probability(density, config);
        if note.is_tall {
            tall += 1;
        }
    }

    debug!("Assigned {}/{} tall obstacles", tall, notes.len());
    tall
}
