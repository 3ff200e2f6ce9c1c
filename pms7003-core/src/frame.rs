//! PMS7003 data frame layout and stream decoding.
//!
//! In active mode the sensor emits a 32-byte frame roughly once per second:
//!
//! ```text
//! 0x42 0x4d | len (u16) | 13 x data (u16) | checksum (u16)
//! ```
//!
//! All words are big-endian. The checksum is the wrapping `u16` sum of the
//! first 30 bytes, start marker included.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Two-byte marker (`"BM"`) opening every frame, in both directions.
pub const START_MARKER: [u8; 2] = [0x42, 0x4d];

/// Total size of a data frame on the wire.
pub const FRAME_LEN: usize = 32;

/// Value of the length field in a data frame: 13 data words plus checksum.
pub const DATA_FRAME_LENGTH: u16 = 28;

/// Value of the length field in a command reply: echoed command, data byte
/// and checksum.
pub const REPLY_FRAME_LENGTH: u16 = 4;

/// Total size of a command reply on the wire.
pub const REPLY_LEN: usize = 8;

const HEADER_LEN: usize = 4;

/// Serial line speed used by the sensor (8N1).
pub const BAUD_RATE: u32 = 9600;

const WORD_COUNT: usize = (FRAME_LEN - START_MARKER.len()) / 2;

/// A single reading reported by the sensor.
///
/// `*_cf1` fields are mass concentrations in µg/m³ for the CF=1 standard
/// particle, `*_atmo` fields are the same under atmospheric environment, and
/// `*_count` fields are the number of particles with a diameter beyond the
/// named size in 0.1 L of air.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    pub frame_length: u16,
    pub pm1_cf1: u16,
    pub pm2_5_cf1: u16,
    pub pm10_cf1: u16,
    pub pm1_atmo: u16,
    pub pm2_5_atmo: u16,
    pub pm10_atmo: u16,
    pub pm0_3_count: u16,
    pub pm0_5_count: u16,
    pub pm1_0_count: u16,
    pub pm2_5_count: u16,
    pub pm5_0_count: u16,
    pub pm10_0_count: u16,
    pub reserved: u16,
    pub checksum: u16,
}

impl Frame {
    /// Parse and validate an exact 32-byte frame.
    ///
    /// # Errors
    /// Returns [`CoreError::MissingStartMarker`] if the frame does not start
    /// with `BM`, [`CoreError::InvalidFrameLength`] if the length field is not
    /// 28, and [`CoreError::ChecksumMismatch`] if the checksum does not match.
    pub fn from_bytes(bytes: &[u8; FRAME_LEN]) -> Result<Self, CoreError> {
        let found = [bytes[0], bytes[1]];
        if found != START_MARKER {
            return Err(CoreError::MissingStartMarker { found });
        }

        let mut words = [0u16; WORD_COUNT];
        for (i, word) in words.iter_mut().enumerate() {
            let at = START_MARKER.len() + 2 * i;
            *word = u16::from_be_bytes([bytes[at], bytes[at + 1]]);
        }
        let frame = Self::from_words(words);

        if frame.frame_length != DATA_FRAME_LENGTH {
            return Err(CoreError::InvalidFrameLength { value: frame.frame_length });
        }
        let actual = checksum(&bytes[..FRAME_LEN - 2]);
        if actual != frame.checksum {
            return Err(CoreError::ChecksumMismatch { expected: frame.checksum, actual });
        }
        Ok(frame)
    }

    /// Encode the frame as it appears on the wire.
    ///
    /// The stored `frame_length` and `checksum` are written as-is; call
    /// [`Frame::sealed`] first to produce a frame the sensor would send.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut out = [0u8; FRAME_LEN];
        out[..2].copy_from_slice(&START_MARKER);
        for (i, word) in self.words().iter().enumerate() {
            let at = START_MARKER.len() + 2 * i;
            out[at..at + 2].copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Return a copy with the length field and checksum filled in.
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.frame_length = DATA_FRAME_LENGTH;
        self.checksum = checksum(&self.to_bytes()[..FRAME_LEN - 2]);
        self
    }

    fn words(&self) -> [u16; WORD_COUNT] {
        [
            self.frame_length,
            self.pm1_cf1,
            self.pm2_5_cf1,
            self.pm10_cf1,
            self.pm1_atmo,
            self.pm2_5_atmo,
            self.pm10_atmo,
            self.pm0_3_count,
            self.pm0_5_count,
            self.pm1_0_count,
            self.pm2_5_count,
            self.pm5_0_count,
            self.pm10_0_count,
            self.reserved,
            self.checksum,
        ]
    }

    fn from_words(w: [u16; WORD_COUNT]) -> Self {
        Self {
            frame_length: w[0],
            pm1_cf1: w[1],
            pm2_5_cf1: w[2],
            pm10_cf1: w[3],
            pm1_atmo: w[4],
            pm2_5_atmo: w[5],
            pm10_atmo: w[6],
            pm0_3_count: w[7],
            pm0_5_count: w[8],
            pm1_0_count: w[9],
            pm2_5_count: w[10],
            pm5_0_count: w[11],
            pm10_0_count: w[12],
            reserved: w[13],
            checksum: w[14],
        }
    }
}

/// Wrapping `u16` sum of `bytes`, as used by both data and command frames.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
}

/// Outcome of a single [`decode`] step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// A valid frame was consumed from the head of the input.
    Frame { frame: Frame, remainder: &'a [u8] },
    /// One byte was discarded. `reason` is set when a marker was present but
    /// the candidate frame failed validation.
    Skip { remainder: &'a [u8], reason: Option<CoreError> },
    /// The sensor's acknowledgement of a command was consumed.
    Reply { command: u8, data: u8, remainder: &'a [u8] },
    /// The input may begin a frame; `needed` more bytes are required.
    Incomplete { needed: usize },
}

enum Step {
    Frame(Frame),
    Reply { command: u8, data: u8 },
    Skip(Option<CoreError>),
    Incomplete(usize),
}

fn step(input: &[u8]) -> Step {
    let head = input.len().min(START_MARKER.len());
    if input[..head] != START_MARKER[..head] {
        return Step::Skip(None);
    }
    let Some(header) = input.first_chunk::<HEADER_LEN>() else {
        return Step::Incomplete(FRAME_LEN - input.len());
    };
    match u16::from_be_bytes([header[2], header[3]]) {
        REPLY_FRAME_LENGTH => return step_reply(input),
        DATA_FRAME_LENGTH => {}
        value => return Step::Skip(Some(CoreError::InvalidFrameLength { value })),
    }
    let Some(bytes) = input.first_chunk::<FRAME_LEN>() else {
        return Step::Incomplete(FRAME_LEN - input.len());
    };
    match Frame::from_bytes(bytes) {
        Ok(frame) => Step::Frame(frame),
        Err(e) => Step::Skip(Some(e)),
    }
}

fn step_reply(input: &[u8]) -> Step {
    let Some(reply) = input.first_chunk::<REPLY_LEN>() else {
        return Step::Incomplete(REPLY_LEN - input.len());
    };
    let expected = u16::from_be_bytes([reply[6], reply[7]]);
    let actual = checksum(&reply[..REPLY_LEN - 2]);
    if expected != actual {
        return Step::Skip(Some(CoreError::ChecksumMismatch { expected, actual }));
    }
    Step::Reply { command: reply[4], data: reply[5] }
}

/// Decode one step from the head of `input`.
///
/// Bytes preceding a start marker are skipped one at a time. A candidate
/// frame that fails validation is also skipped by a single byte, so a real
/// frame beginning inside a corrupted one is still found. A length field
/// other than 28 or 4 is rejected as soon as the header is available.
#[must_use]
pub fn decode(input: &[u8]) -> Decoded<'_> {
    match step(input) {
        Step::Frame(frame) => Decoded::Frame { frame, remainder: &input[FRAME_LEN..] },
        Step::Reply { command, data } => {
            Decoded::Reply { command, data, remainder: &input[REPLY_LEN..] }
        }
        Step::Skip(reason) => Decoded::Skip { remainder: &input[1..], reason },
        Step::Incomplete(needed) => Decoded::Incomplete { needed },
    }
}

/// Reassembles frames from a byte stream split at arbitrary boundaries.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    skipped: u64,
    replies: u64,
}

impl FrameDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the sensor.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Return the next frame or validation error, or `None` when more input
    /// is needed. Noise bytes and command replies are discarded silently.
    pub fn next_frame(&mut self) -> Option<Result<Frame, CoreError>> {
        loop {
            match step(&self.buf) {
                Step::Frame(frame) => {
                    self.buf.drain(..FRAME_LEN);
                    return Some(Ok(frame));
                }
                Step::Reply { .. } => {
                    self.buf.drain(..REPLY_LEN);
                    self.replies += 1;
                }
                Step::Skip(reason) => {
                    self.buf.drain(..1);
                    self.skipped += 1;
                    if let Some(e) = reason {
                        return Some(Err(e));
                    }
                }
                Step::Incomplete(_) => return None,
            }
        }
    }

    /// Number of bytes discarded so far.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Number of command replies consumed so far.
    #[must_use]
    pub fn replies(&self) -> u64 {
        self.replies
    }

    /// Number of bytes waiting for the rest of a frame.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) const GOLDEN_PACKET: &[u8] = &[
        0x42, 0x4d, 0x00, 0x1c, 0x00, 0x03, 0x00, 0x04, 0x00, 0x07, 0x00, 0x03, 0x00, 0x04, 0x00,
        0x07, 0x02, 0xd0, 0x00, 0xb8, 0x00, 0x19, 0x00, 0x08, 0x00, 0x04, 0x00, 0x02, 0x97, 0x00,
        0x03, 0x0f,
    ];

    /// Sensor acknowledgement of `SetMode(Active)`.
    const MODE_REPLY: [u8; REPLY_LEN] = [0x42, 0x4d, 0x00, 0x04, 0xe1, 0x01, 0x01, 0x75];

    fn golden_frame() -> Frame {
        Frame {
            frame_length: 28,
            pm1_cf1: 3,
            pm2_5_cf1: 4,
            pm10_cf1: 7,
            pm1_atmo: 3,
            pm2_5_atmo: 4,
            pm10_atmo: 7,
            pm0_3_count: 720,
            pm0_5_count: 184,
            pm1_0_count: 25,
            pm2_5_count: 8,
            pm5_0_count: 4,
            pm10_0_count: 2,
            reserved: 38656,
            checksum: 783,
        }
    }

    #[test]
    fn decode_golden_packet_yields_frame_and_empty_remainder() {
        assert_eq!(
            decode(GOLDEN_PACKET),
            Decoded::Frame { frame: golden_frame(), remainder: &[] }
        );
    }

    #[test]
    fn decode_start_marker_only_is_incomplete() {
        assert_eq!(decode(&START_MARKER), Decoded::Incomplete { needed: 30 });
    }

    #[test]
    fn decode_partial_marker_is_incomplete() {
        assert_eq!(decode(&[0x42]), Decoded::Incomplete { needed: 31 });
        assert_eq!(decode(&[]), Decoded::Incomplete { needed: FRAME_LEN });
    }

    #[test]
    fn decode_noise_skips_one_byte() {
        assert_eq!(decode(b"abc"), Decoded::Skip { remainder: b"bc", reason: None });
    }

    #[test]
    fn decode_bad_checksum_skips_with_reason() {
        let mut bytes = GOLDEN_PACKET.to_vec();
        bytes[31] ^= 0x01;
        match decode(&bytes) {
            Decoded::Skip { remainder, reason } => {
                assert_eq!(remainder.len(), FRAME_LEN - 1);
                assert_eq!(
                    reason,
                    Some(CoreError::ChecksumMismatch { expected: 782, actual: 783 })
                );
            }
            other => panic!("expected Skip, got {other:?}"),
        }
    }

    #[test]
    fn decode_bad_length_field_is_rejected() {
        let mut bytes = GOLDEN_PACKET.to_vec();
        bytes[3] = 0x14;
        match decode(&bytes) {
            Decoded::Skip { reason: Some(CoreError::InvalidFrameLength { value }), .. } => {
                assert_eq!(value, 0x14);
            }
            other => panic!("expected InvalidFrameLength, got {other:?}"),
        }
    }

    #[test]
    fn decode_bad_length_is_rejected_from_header_alone() {
        let header = [0x42, 0x4d, 0x00, 0x14];
        assert_eq!(
            decode(&header),
            Decoded::Skip {
                remainder: &header[1..],
                reason: Some(CoreError::InvalidFrameLength { value: 0x14 }),
            }
        );
    }

    #[test]
    fn decode_command_reply_is_consumed_whole() {
        let mut input = MODE_REPLY.to_vec();
        input.extend_from_slice(b"xy");
        assert_eq!(
            decode(&input),
            Decoded::Reply { command: 0xe1, data: 0x01, remainder: b"xy" }
        );
        assert_eq!(decode(&MODE_REPLY[..6]), Decoded::Incomplete { needed: 2 });
    }

    #[test]
    fn decode_command_reply_with_bad_checksum_is_rejected() {
        let mut reply = MODE_REPLY;
        reply[7] ^= 0x01;
        match decode(&reply) {
            Decoded::Skip { reason: Some(CoreError::ChecksumMismatch { expected, actual }), .. } => {
                assert_eq!(expected, 0x0174);
                assert_eq!(actual, 0x0175);
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn frame_decoder_skips_command_reply_before_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.push(&MODE_REPLY);
        decoder.push(GOLDEN_PACKET);
        assert_eq!(decoder.next_frame(), Some(Ok(golden_frame())));
        assert_eq!(decoder.next_frame(), None);
        assert_eq!(decoder.replies(), 1);
        assert_eq!(decoder.skipped(), 0);
    }

    #[test]
    fn to_bytes_reproduces_golden_packet() {
        assert_eq!(golden_frame().to_bytes().as_slice(), GOLDEN_PACKET);
    }

    #[test]
    fn sealed_frame_passes_validation() {
        let frame = Frame { pm2_5_cf1: 42, pm10_cf1: 90, ..Frame::default() }.sealed();
        assert_eq!(frame.frame_length, DATA_FRAME_LENGTH);
        assert_eq!(Frame::from_bytes(&frame.to_bytes()), Ok(frame));
    }

    #[test]
    fn checksum_wraps_instead_of_overflowing() {
        let bytes = vec![0xff_u8; 300];
        assert_eq!(checksum(&bytes), (255u32 * 300 % 65536) as u16);
    }

    #[test]
    fn frame_decoder_finds_frame_after_noise() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"\x00\x13garbage");
        decoder.push(GOLDEN_PACKET);
        assert_eq!(decoder.next_frame(), Some(Ok(golden_frame())));
        assert_eq!(decoder.next_frame(), None);
        assert_eq!(decoder.skipped(), 9);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn frame_decoder_joins_frame_split_across_reads() {
        let mut decoder = FrameDecoder::new();
        decoder.push(&GOLDEN_PACKET[..10]);
        assert_eq!(decoder.next_frame(), None);
        assert_eq!(decoder.buffered(), 10);
        decoder.push(&GOLDEN_PACKET[10..]);
        assert_eq!(decoder.next_frame(), Some(Ok(golden_frame())));
    }

    #[test]
    fn frame_decoder_recovers_frame_inside_corrupted_one() {
        // A truncated frame is followed immediately by a valid one; the bad
        // candidate swallows the head of the real frame, which must still be
        // found after the rejection.
        let mut stream = GOLDEN_PACKET[..12].to_vec();
        stream.extend_from_slice(GOLDEN_PACKET);
        let mut decoder = FrameDecoder::new();
        decoder.push(&stream);

        let first = decoder.next_frame();
        assert!(matches!(first, Some(Err(_))), "truncated frame must be rejected, got {first:?}");
        assert_eq!(decoder.next_frame(), Some(Ok(golden_frame())));
        assert_eq!(decoder.next_frame(), None);
    }

    fn arb_frame() -> impl Strategy<Value = Frame> {
        proptest::array::uniform12(any::<u16>()).prop_map(|v| {
            Frame {
                pm1_cf1: v[0],
                pm2_5_cf1: v[1],
                pm10_cf1: v[2],
                pm1_atmo: v[3],
                pm2_5_atmo: v[4],
                pm10_atmo: v[5],
                pm0_3_count: v[6],
                pm0_5_count: v[7],
                pm1_0_count: v[8],
                pm2_5_count: v[9],
                pm5_0_count: v[10],
                pm10_0_count: v[11],
                ..Frame::default()
            }
            .sealed()
        })
    }

    proptest! {
        #[test]
        fn proptest_decode_never_panics(input in proptest::collection::vec(any::<u8>(), 0..128usize)) {
            match decode(&input) {
                Decoded::Frame { remainder, .. } => prop_assert_eq!(remainder.len(), input.len() - FRAME_LEN),
                Decoded::Reply { remainder, .. } => prop_assert_eq!(remainder.len(), input.len() - REPLY_LEN),
                Decoded::Skip { remainder, .. } => prop_assert_eq!(remainder.len(), input.len() - 1),
                Decoded::Incomplete { needed } => prop_assert!(needed >= 1 && needed <= FRAME_LEN),
            }
        }

        #[test]
        fn proptest_reassembly_ignores_chunk_boundaries(
            frames in proptest::collection::vec(arb_frame(), 1..6usize),
            noise in proptest::collection::vec(any::<u8>().prop_filter("no marker byte", |b| *b != 0x42), 0..16usize),
            chunk in 1..40usize,
        ) {
            let mut stream = noise.clone();
            for frame in &frames {
                stream.extend_from_slice(&frame.to_bytes());
                stream.extend_from_slice(&noise);
            }

            let mut decoder = FrameDecoder::new();
            let mut decoded = Vec::new();
            for piece in stream.chunks(chunk) {
                decoder.push(piece);
                while let Some(result) = decoder.next_frame() {
                    prop_assert!(result.is_ok(), "unexpected rejection: {:?}", result);
                    if let Ok(frame) = result {
                        decoded.push(frame);
                    }
                }
            }
            prop_assert_eq!(decoded, frames);
        }
    }
}
