use crate::model::error::DecodeError;
use crate::model::track::*;
use log::{debug, info, warn};
use std::collections::HashMap;

const HEADER_LEN: usize = 14;
const CHUNK_HEADER_LEN: usize = 8;
const META_SET_TEMPO: u8 = 0x51;

/// Reads a big-endian base-128 variable-length quantity from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed. A quantity cut off by the end of
/// the slice ends there.
pub fn read_vlq(bytes: &[u8]) -> (u32, usize) {
    let mut value = 0u32;
    let mut consumed = 0;

    for &byte in bytes {
        consumed += 1;
        value = (value << 7) | (byte & 0x7F) as u32;
        if (byte & 0x80) == 0 {
            break;
        }
    }

    (value, consumed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackEvent {
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8 },
    Tempo(u32),
    Other,
}

/// Walks the timed events of one track body. Reads never leave `data`: a missing data
/// byte reads as 0 and skips are clamped to the end of the body.
#[derive(Debug, Clone, Copy)]
struct TrackReader<'a> {
    data: &'a [u8],
    offset: usize,
    running_status: Option<u8>,
}

impl<'a> TrackReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            running_status: None,
        }
    }

    fn next_event(&mut self) -> Option<(u32, TrackEvent)> {
        if self.offset >= self.data.len() {
            return None;
        }

        let delta = self.read_vlq();
        let &byte = self.data.get(self.offset)?;

        let status = if byte < 0x80 {
            match self.running_status {
                Some(status) => status,
                None => {
                    debug!(
                        "Data byte {:#04x} without running status at offset {}, skipping..!",
                        byte, self.offset
                    );
                    self.offset += 1;
                    return Some((delta, TrackEvent::Other));
                }
            }
        } else {
            self.offset += 1;
            // Only channel-voice bytes set running status; meta and sysex keep the previous
            // channel status so a later data byte still resolves to a channel event.
            if byte < 0xF0 {
                self.running_status = Some(byte);
            }
            byte
        };

        let event = match status & 0xF0 {
            0x80 => {
                let key = self.data_byte();
                let _velocity = self.data_byte();
                TrackEvent::NoteOff { key }
            }
            0x90 => {
                let key = self.data_byte();
                let velocity = self.data_byte();
                if velocity == 0 {
                    TrackEvent::NoteOff { key }
                } else {
                    TrackEvent::NoteOn { key, velocity }
                }
            }
            0xA0 | 0xB0 | 0xE0 => {
                self.skip(2);
                TrackEvent::Other
            }
            0xC0 | 0xD0 => {
                self.skip(1);
                TrackEvent::Other
            }
            _ => match status {
                0xFF => self.meta_event(),
                0xF0 | 0xF7 => {
                    let len = self.read_vlq() as usize;
                    self.skip(len);
                    TrackEvent::Other
                }
                _ => TrackEvent::Other,
            },
        };

        Some((delta, event))
    }

    fn meta_event(&mut self) -> TrackEvent {
        let meta_type = self.data_byte();
        let len = self.read_vlq() as usize;
        let start = self.offset;
        self.skip(len);
        let payload = &self.data[start..self.offset];

        match (meta_type, payload) {
            (META_SET_TEMPO, &[a, b, c]) if len == 3 => {
                TrackEvent::Tempo(u32::from_be_bytes([0, a, b, c]))
            }
            _ => TrackEvent::Other,
        }
    }

    fn data_byte(&mut self) -> u8 {
        let byte = self.data.get(self.offset).copied().unwrap_or(0);
        self.skip(1);
        byte & 0x7F
    }

    fn skip(&mut self, len: usize) {
        self.offset = self.offset.saturating_add(len).min(self.data.len());
    }

    fn read_vlq(&mut self) -> u32 {
        let (value, consumed) = read_vlq(&self.data[self.offset..]);
        self.offset += consumed;
        value
    }
}

/// Decodes one track body, appending its notes in emission order. Returns the last tempo seen.
fn decode_track(data: &[u8], track_idx: usize, notes: &mut Vec<RawNoteEvent>) -> Option<u32> {
    let mut reader = TrackReader::new(data);
    let mut current_tick: u32 = 0;
    let mut tempo = None;
    let mut pending: HashMap<u8, (u32, u8)> = HashMap::new();

    while let Some((delta, event)) = reader.next_event() {
        current_tick = current_tick.saturating_add(delta);

        match event {
            TrackEvent::NoteOn { key, velocity } => {
                if pending.insert(key, (current_tick, velocity)).is_some() {
                    debug!(
                        "Re-triggered NoteOn for {} at tick {} (track {}), abandoning the earlier one..!",
                        key, current_tick, track_idx
                    );
                }
            }
            TrackEvent::NoteOff { key } => match pending.remove(&key) {
                Some((start_tick, velocity)) => notes.push(RawNoteEvent {
                    start_tick,
                    duration_ticks: current_tick - start_tick,
                    pitch: key,
                    velocity,
                }),
                None => debug!(
                    "Orphaned NoteOff for {} at tick {} (track {})..!",
                    key, current_tick, track_idx
                ),
            },
            TrackEvent::Tempo(mpqn) => {
                debug!(
                    "Tempo change at tick {} -> {} us/qn (track {})",
                    current_tick, mpqn, track_idx
                );
                tempo = Some(mpqn);
            }
            TrackEvent::Other => {}
        }
    }

    if !pending.is_empty() {
        debug!(
            "Dropping {} unclosed NoteOn(s) at the end of track {}..!",
            pending.len(),
            track_idx
        );
    }

    tempo
}

fn chunk_tag(tag: &[u8]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

/// Decodes a Standard MIDI File into its notes and a single effective tempo.
///
/// All tracks are concatenated regardless of the header's format field. The tempo is the
/// last Set Tempo event encountered, in file order, and applies to the whole file.
pub fn decode_midi(bytes: &[u8]) -> Result<DecodedMidi, DecodeError> {
    let Some(tag) = bytes.get(0..4) else {
        return Err(DecodeError::TruncatedHeader { len: bytes.len() });
    };
    if tag != b"MThd" {
        return Err(DecodeError::MalformedHeader {
            found: chunk_tag(tag),
        });
    }
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::TruncatedHeader { len: bytes.len() });
    }

    let _header_len = u32::from_be_bytes(bytes[4..8].try_into().unwrap_or([0; 4]));
    let format = u16::from_be_bytes(bytes[8..10].try_into().unwrap_or([0; 2]));
    let track_count = u16::from_be_bytes(bytes[10..12].try_into().unwrap_or([0; 2]));
    let mut ticks_per_beat = u16::from_be_bytes(bytes[12..14].try_into().unwrap_or([0; 2]));

    debug!(
        "MIDI format: {}, tracks: {}, ticks per beat: {}",
        format, track_count, ticks_per_beat
    );

    if ticks_per_beat == 0 {
        warn!(
            "Header declares 0 ticks per beat, falling back to {}..!",
            DEFAULT_TICKS_PER_BEAT
        );
        ticks_per_beat = DEFAULT_TICKS_PER_BEAT;
    }

    let mut microseconds_per_beat = DEFAULT_MPQN;
    let mut notes: Vec<RawNoteEvent> = Vec::new();
    let mut pos = HEADER_LEN;

    for index in 0..track_count as usize {
        let available = bytes.len().saturating_sub(pos);
        let (Some(tag), Some(len_bytes)) = (bytes.get(pos..pos + 4), bytes.get(pos + 4..pos + 8))
        else {
            return Err(DecodeError::TruncatedTrack {
                index,
                declared: CHUNK_HEADER_LEN,
                available,
            });
        };

        if tag != b"MTrk" {
            return Err(DecodeError::MalformedTrackHeader {
                index,
                found: chunk_tag(tag),
            });
        }

        let declared = u32::from_be_bytes(len_bytes.try_into().unwrap_or([0; 4])) as usize;
        let body_start = pos + CHUNK_HEADER_LEN;
        let body_end = body_start.saturating_add(declared);
        let Some(body) = bytes.get(body_start..body_end) else {
            return Err(DecodeError::TruncatedTrack {
                index,
                declared,
                available: bytes.len() - body_start,
            });
        };

        if let Some(mpqn) = decode_track(body, index, &mut notes) {
            microseconds_per_beat = mpqn;
        }

        pos = body_end;
    }

    notes.sort_by_key(|note| note.start_tick);

    let tempo = TempoInfo {
        ticks_per_beat,
        microseconds_per_beat,
    };

    info!(
        "Decoded {} notes, final tempo: {} us/qn ({:.0} BPM)",
        notes.len(),
        tempo.microseconds_per_beat,
        tempo.bpm()
    );

    Ok(DecodedMidi {
        format,
        track_count,
        tempo,
        notes,
    })
}
