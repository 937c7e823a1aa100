//! Fuzz target: `FrameDecoder::feed`
//!
//! Drives arbitrary byte sequences into the streaming decoder, split at a
//! fuzzer-chosen point, and checks that it never panics, always makes
//! progress, and never yields an empty or oversized payload.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use sitegate::rpc::codec::{FrameDecoder, MAX_FRAME_SIZE};

fn drain(decoder: &mut FrameDecoder, mut data: &[u8]) {
    while !data.is_empty() {
        let (used, payload) = decoder.feed(data);
        if let Some(payload) = payload {
            assert!(payload.len() <= MAX_FRAME_SIZE, "payload exceeds MAX_FRAME_SIZE");
            assert!(!payload.is_empty(), "decoder must not yield empty payload");
        }
        assert!(used > 0 && used <= data.len(), "decoder must consume input");
        data = &data[used..];
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());

    let mut decoder = FrameDecoder::new();
    drain(&mut decoder, &rest[..split]);
    drain(&mut decoder, &rest[split..]);

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    drain(&mut decoder, rest);
});
