use crate::model::track::{DecodedMidi, Metadata, PlacedNote, Track};
use log::info;
use serde::{Deserialize, Serialize};

mod height;
mod lanes;
mod repair;
mod speed;

pub use height::{assign_heights, local_density};
pub use lanes::assign_lane;
pub use repair::enforce_max_lanes;
pub use speed::calibrate_speed;

/// Tuning for the placement passes. The defaults are the stock game tuning.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub lane_count: u8,
    /// Distinct lanes allowed inside one repair window.
    pub max_lanes: u8,
    pub window_seconds: f64,
    pub window_step_seconds: f64,
    pub density_radius_seconds: f64,
    /// Notes inside the density radius that count as fully dense.
    pub density_saturation: u32,
    /// `(density threshold, tall probability)` pairs, highest threshold first.
    pub tall_tiers: Vec<(f64, f64)>,
    pub sparse_tall_probability: f64,
    pub chord_threshold_seconds: f64,
    pub target_distance: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub default_speed: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            lane_count: 5,
            max_lanes: 3,
            window_seconds: 0.3,
            window_step_seconds: 0.1,
            density_radius_seconds: 1.0,
            density_saturation: 20,
            tall_tiers: vec![(0.8, 0.15), (0.5, 0.30)],
            sparse_tall_probability: 0.45,
            chord_threshold_seconds: 0.01,
            target_distance: 4.0,
            min_speed: 0.08,
            max_speed: 0.6,
            default_speed: 0.15,
        }
    }
}

/// Deterministic map from a seed to `[0, 1)`: the fractional part of `sin(seed) * 10000`.
pub fn seeded_random(seed: f64) -> f64 {
    let x = seed.sin() * 10000.0;
    x - x.floor()
}

/// Picks `slots[floor(r * len)]`. `r` may round up to exactly 1.0, so the index is clamped.
pub(crate) fn pick_index(r: f64, len: usize) -> usize {
    ((r * len as f64).floor() as usize).min(len.saturating_sub(1))
}

pub fn generate_track(decoded: &DecodedMidi) -> Track {
    generate_track_with(decoded, &GeneratorConfig::default())
}

/// Runs lane assignment, height assignment, lane-count repair and speed calibration in order.
pub fn generate_track_with(decoded: &DecodedMidi, config: &GeneratorConfig) -> Track {
    let tempo = decoded.tempo;

    let mut notes: Vec<PlacedNote> = decoded
        .notes
        .iter()
        .map(|raw| PlacedNote::new(raw, &tempo, assign_lane(raw.start_tick, config.lane_count)))
        .collect();

    assign_heights(&mut notes, config);
    enforce_max_lanes(&mut notes, config);
    let base_speed = calibrate_speed(&notes, config);

    let track = Track {
        metadata: Metadata {
            title: None,
            tempo_bpm: tempo.bpm(),
            ticks_per_beat: tempo.ticks_per_beat,
        },
        notes,
        base_speed,
    };

    info!(
        "Generated track with {} notes ({} tall), base speed {:.3}",
        track.notes.len(),
        track.tall_count(),
        track.base_speed
    );

    track
}
