use serde::{Deserialize, Serialize};

pub const DEFAULT_MPQN: u32 = 500_000;
pub const DEFAULT_TICKS_PER_BEAT: u16 = 480;
pub const MICROSECONDS_PER_MINUTE: f64 = 60_000_000.0;

/// Scene units a note travels per second are `base_speed * REFERENCE_FPS`.
pub const REFERENCE_FPS: f64 = 60.0;

/// One matched note-on/note-off pair, in file ticks.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawNoteEvent {
    pub start_tick: u32,
    pub duration_ticks: u32,
    pub pitch: u8,
    pub velocity: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoInfo {
    pub ticks_per_beat: u16,
    pub microseconds_per_beat: u32,
}

impl Default for TempoInfo {
    fn default() -> Self {
        Self {
            ticks_per_beat: DEFAULT_TICKS_PER_BEAT,
            microseconds_per_beat: DEFAULT_MPQN,
        }
    }
}

impl TempoInfo {
    pub fn ticks_to_seconds(&self, ticks: u32) -> f64 {
        (ticks as f64 / self.ticks_per_beat as f64) * (self.microseconds_per_beat as f64 / 1_000_000.0)
    }

    pub fn bpm(&self) -> f64 {
        MICROSECONDS_PER_MINUTE / self.microseconds_per_beat.max(1) as f64
    }
}

/// Everything the decoder extracts from a file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DecodedMidi {
    pub format: u16,
    pub track_count: u16,
    pub tempo: TempoInfo,
    /// Sorted ascending by `start_tick`, ties in track order then in-track order.
    pub notes: Vec<RawNoteEvent>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlacedNote {
    pub start_tick: u32,
    pub duration_ticks: u32,
    pub pitch: u8,
    pub velocity: u8,
    pub time_seconds: f64,
    pub duration_seconds: f64,
    pub lane: u8,
    pub is_tall: bool,
    /// Owned by the gameplay loop, always false when a track is generated.
    pub triggered: bool,
    pub collided: bool,
}

impl PlacedNote {
    pub fn new(raw: &RawNoteEvent, tempo: &TempoInfo, lane: u8) -> Self {
        Self {
            start_tick: raw.start_tick,
            duration_ticks: raw.duration_ticks,
            pitch: raw.pitch,
            velocity: raw.velocity,
            time_seconds: tempo.ticks_to_seconds(raw.start_tick),
            duration_seconds: tempo.ticks_to_seconds(raw.duration_ticks),
            lane,
            is_tall: false,
            triggered: false,
            collided: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub tempo_bpm: f64,
    pub ticks_per_beat: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Track {
    pub metadata: Metadata,
    pub notes: Vec<PlacedNote>,
    pub base_speed: f64,
}

impl Track {
    /// Distance from the trigger line at which a note timed at `time_seconds` spawns.
    pub fn travel_distance(&self, time_seconds: f64) -> f64 {
        time_seconds * self.base_speed * REFERENCE_FPS
    }

    pub fn duration_seconds(&self) -> f64 {
        self.notes
            .iter()
            .map(|note| note.time_seconds + note.duration_seconds)
            .fold(0.0, f64::max)
    }

    pub fn tall_count(&self) -> usize {
        self.notes.iter().filter(|note| note.is_tall).count()
    }

    /// Distinct lanes occupied by notes timed within `[start, start + width)`, in lane order.
    pub fn lanes_in_window(&self, start: f64, width: f64) -> Vec<u8> {
        let mut lanes: Vec<u8> = self
            .notes
            .iter()
            .filter(|note| note.time_seconds >= start && note.time_seconds < start + width)
            .map(|note| note.lane)
            .collect();
        lanes.sort_unstable();
        lanes.dedup();
        lanes
    }

    /// Clears the gameplay flags so the same track can be replayed from the top.
    pub fn reset_flags(&mut self) {
        for note in self.notes.iter_mut() {
            note.triggered = false;
            note.collided = false;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9
    }

    fn placed(time_seconds: f64, lane: u8) -> PlacedNote {
        PlacedNote {
            start_tick: 0,
            duration_ticks: 0,
            pitch: 60,
            velocity: 100,
            time_seconds,
            duration_seconds: 0.25,
            lane,
            is_tall: false,
            triggered: false,
            collided: false,
        }
    }

    #[test]
    fn tempo_conversion() {
        let tempo = TempoInfo {
            ticks_per_beat: 480,
            microseconds_per_beat: 500_000,
        };

        assert_eq!(tempo.ticks_to_seconds(0), 0.0);
        assert_eq!(tempo.ticks_to_seconds(480), 0.5);
        assert_eq!(tempo.ticks_to_seconds(960), 1.0);
        assert_eq!(tempo.bpm(), 120.0);
    }

    #[test]
    fn placed_note_starts_untouched() {
        let raw = RawNoteEvent {
            start_tick: 960,
            duration_ticks: 240,
            pitch: 64,
            velocity: 90,
        };
        let note = PlacedNote::new(&raw, &TempoInfo::default(), 2);

        assert_eq!(note.time_seconds, 1.0);
        assert_eq!(note.duration_seconds, 0.25);
        assert_eq!(note.lane, 2);
        assert!(!note.is_tall && !note.triggered && !note.collided);
    }

    #[test]
    fn window_lanes_and_reset() {
        let mut track = Track {
            metadata: Metadata::default(),
            notes: vec![placed(0.0, 4), placed(0.1, 1), placed(0.2, 4), placed(0.3, 0)],
            base_speed: 0.2,
        };

        assert_eq!(track.lanes_in_window(0.0, 0.3), vec![1, 4]);
        assert_eq!(track.lanes_in_window(0.25, 0.3), vec![0]);
        assert!(approx_eq(track.travel_distance(2.0), 24.0));
        assert!(approx_eq(track.duration_seconds(), 0.55));

        track.notes[1].triggered = true;
        track.notes[2].collided = true;
        track.reset_flags();
        assert!(track.notes.iter().all(|n| !n.triggered && !n.collided));
    }
}
