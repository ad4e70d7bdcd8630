//! Fuzz target for the response envelope decoder.
//!
//! Run with: cargo +nightly fuzz run fuzz_envelope_decode
//!
//! Decodes arbitrary bytes as daemon responses for a few result shapes.
//! Malformed input must come back as an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use seedbox_rpc::envelope::decode_response;
use seedbox_rpc::{NoResult, SessionStats, TorrentAddResult, TorrentGetResult};

fuzz_target!(|data: &[u8]| {
    let _ = decode_response::<NoResult>("session-close", data);
    let _ = decode_response::<SessionStats>("session-stats", data);
    let _ = decode_response::<TorrentAddResult>("torrent-add", data);
    if let Ok(outcome) = decode_response::<TorrentGetResult>("torrent-get", data) {
        let _ = outcome.into_result("torrent-get");
    }
});
