//! Fuzz target: stream reassembly.
//!
//! The first byte picks a chunk size; the rest is pushed through a
//! `FrameDecoder` in chunks of that size. The decoder must never panic and
//! must never hold more than one partial frame once drained.
#![no_main]

use libfuzzer_sys::fuzz_target;
use pms7003_core::{FrameDecoder, FRAME_LEN};

fuzz_target!(|data: &[u8]| {
    let Some((&chunk, stream)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk).max(1);

    let mut decoder = FrameDecoder::new();
    for piece in stream.chunks(chunk) {
        decoder.push(piece);
        while decoder.next_frame().is_some() {}
        assert!(decoder.buffered() < FRAME_LEN);
    }
});
