use crate::generator::{GeneratorConfig, generate_track_with};
use crate::midi_decoder::decode_midi;
use crate::model::error::DecodeError;
use crate::model::track::Track;
use anyhow::{Result, anyhow};
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Raw MIDI bytes in, fully placed track out, using the default tuning.
pub fn plan_track(bytes: &[u8]) -> Result<Track, DecodeError> {
    plan_track_with(bytes, &GeneratorConfig::default())
}

pub fn plan_track_with(bytes: &[u8], config: &GeneratorConfig) -> Result<Track, DecodeError> {
    let decoded = decode_midi(bytes)?;

    debug!(
        "Planning {} notes from {} track(s) at {} ticks per beat",
        decoded.notes.len(),
        decoded.track_count,
        decoded.tempo.ticks_per_beat
    );

    Ok(generate_track_with(&decoded, config))
}

pub fn import_midi_file<P: AsRef<Path>>(path: P, config: &GeneratorConfig) -> Result<Track> {
    let bytes = fs::read(path.as_ref()).map_err(|e| {
        anyhow!(
            "Failed to read MIDI file {}: {}",
            path.as_ref().display(),
            e
        )
    })?;

    let mut track = plan_track_with(&bytes, config)
        .map_err(|e| anyhow!("Failed to parse MIDI {}: {}", path.as_ref().display(), e))?;

    if track.notes.is_empty() {
        warn!(
            "MIDI file {} contains no playable notes..!",
            path.as_ref().display()
        );
    }

    track.metadata.title = path
        .as_ref()
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string());

    Ok(track)
}
