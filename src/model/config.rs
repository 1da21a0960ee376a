use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lane_runner",
    about = "Plan a lane-runner track from a MIDI file!"
)]
pub struct Args {
    /// Path to the target MIDI file.
    pub midi: PathBuf,

    /// Maximum placed notes to preview.
    #[arg(short, long, default_value_t = 20)]
    pub dry_run_max: usize,

    /// Number of lanes notes are spread across.
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub lanes: u8,

    /// Most distinct lanes allowed inside one 0.3s window.
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub max_lanes: u8,

    /// Prints extra information to the terminal.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["lane_runner", "song.mid"]);

        assert_eq!(args.midi, PathBuf::from("song.mid"));
        assert_eq!(args.dry_run_max, 20);
        assert_eq!(args.lanes, 5);
        assert_eq!(args.max_lanes, 3);
        assert!(!args.verbose);
    }

    #[test]
    fn lane_bounds_are_checked() {
        assert!(Args::try_parse_from(["lane_runner", "song.mid", "--lanes", "0"]).is_err());
        let args = Args::try_parse_from(["lane_runner", "song.mid", "-l", "4", "-m", "2", "-v"]).unwrap();
        assert_eq!((args.lanes, args.max_lanes, args.verbose), (4, 2, true));
    }
}
