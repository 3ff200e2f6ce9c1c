//! Fuzz target: single-step frame decoding.
//!
//! `decode` must never panic and must always make progress or ask for more
//! bytes.
#![no_main]

use libfuzzer_sys::fuzz_target;
use pms7003_core::{checksum, decode, Decoded, Frame, FRAME_LEN, REPLY_LEN};

fuzz_target!(|data: &[u8]| {
    match decode(data) {
        Decoded::Frame { frame, remainder } => {
            assert_eq!(remainder.len(), data.len() - FRAME_LEN);
            // Only validated frames are produced, so they re-encode exactly.
            assert_eq!(&frame.to_bytes()[..], &data[..FRAME_LEN]);
            assert_eq!(frame, frame.sealed());
        }
        Decoded::Reply { remainder, .. } => {
            assert_eq!(remainder.len(), data.len() - REPLY_LEN);
            let lrc = u16::from_be_bytes([data[6], data[7]]);
            assert_eq!(lrc, checksum(&data[..REPLY_LEN - 2]));
        }
        Decoded::Skip { remainder, .. } => assert_eq!(remainder.len(), data.len() - 1),
        Decoded::Incomplete { needed } => assert!((1..=FRAME_LEN).contains(&needed)),
    }

    if let Some(bytes) = data.first_chunk::<FRAME_LEN>() {
        let _ = Frame::from_bytes(bytes);
    }
});
