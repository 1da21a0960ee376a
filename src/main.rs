use anyhow::Result;
use clap::Parser;
use lane_runner::{Args, GeneratorConfig, import_midi_file};
use log::{debug, info};

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = GeneratorConfig {
        lane_count: args.lanes,
        max_lanes: args.max_lanes,
        ..GeneratorConfig::default()
    };
    debug!("Generator config: {:?}", config);

    info!("Planning track from MIDI file: '{}'...", args.midi.display());
    let track = import_midi_file(&args.midi, &config)?;

    info!(
        "Planned '{}': {} notes ({} tall), {:.0} BPM, base speed {:.3}, {:.1}s long..!",
        track
            .metadata
            .title
            .clone()
            .unwrap_or_else(|| "<unknown>".into()),
        track.notes.len(),
        track.tall_count(),
        track.metadata.tempo_bpm,
        track.base_speed,
        track.duration_seconds()
    );

    info!("Previewing at most {} notes..!", args.dry_run_max);
    for (i, note) in track.notes.iter().take(args.dry_run_max).enumerate() {
        info!(
            "Note {}: time={:.3}s lane={} tall={} pitch={} vel={} distance={:.2}",
            i,
            note.time_seconds,
            note.lane,
            note.is_tall,
            note.pitch,
            note.velocity,
            track.travel_distance(note.time_seconds)
        );
    }

    Ok(())
}
