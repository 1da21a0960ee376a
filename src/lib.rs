mod generator;
mod midi_decoder;
mod midi_importer;
mod model;

pub use generator::*;
pub use midi_decoder::*;
pub use midi_importer::*;
pub use model::config::*;
pub use model::error::*;
pub use model::track::*;
