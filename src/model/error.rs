//! Failures raised while decoding a Standard MIDI File.
//!
//! Every variant aborts the whole decode; there is no partial result. A file that decodes
//! cleanly but holds no notes is not an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer is shorter than the fixed 14-byte `MThd` header.
    #[error("MIDI header is truncated: need 14 bytes, got {len}")]
    TruncatedHeader { len: usize },

    /// The first chunk tag is not `MThd`.
    #[error("Not a MIDI file: expected chunk tag 'MThd', found {found:?}")]
    MalformedHeader { found: String },

    /// A track chunk tag is not `MTrk`.
    #[error("Track {index} has an invalid chunk tag: expected 'MTrk', found {found:?}")]
    MalformedTrackHeader { index: usize, found: String },

    /// A track chunk (its 8-byte chunk header, or its declared body) runs past the end of the buffer.
    #[error("Track {index} is truncated: needs {declared} bytes, only {available} remain")]
    TruncatedTrack {
        index: usize,
        declared: usize,
        available: usize,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = DecodeError::TruncatedTrack {
            index: 2,
            declared: 100,
            available: 12,
        };
        assert_eq!(
            err.to_string(),
            "Track 2 is truncated: needs 100 bytes, only 12 remain"
        );

        let err = DecodeError::MalformedHeader {
            found: "RIFF".into(),
        };
        assert_eq!(
            err.to_string(),
            "Not a MIDI file: expected chunk tag 'MThd', found \"RIFF\""
        );
    }
}
