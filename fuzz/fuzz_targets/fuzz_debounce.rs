//! Fuzz target: `DebounceFilter::update`
//!
//! Replays arbitrary sample streams across all sixteen channels and
//! asserts the filter never panics and edges strictly alternate per
//! channel.
//!
//! cargo fuzz run fuzz_debounce

#![no_main]

use libfuzzer_sys::fuzz_target;
use relayboard::config::CHANNEL_COUNT;
use relayboard::debounce::{DebounceFilter, Edge};

fuzz_target!(|data: &[u8]| {
    let Some((&window, samples)) = data.split_first() else {
        return;
    };
    let window = window.max(1);

    let mut filter = DebounceFilter::new(window, [false; CHANNEL_COUNT]);
    let mut last_edge = [Edge::Release; CHANNEL_COUNT];

    for &byte in samples {
        let index = usize::from(byte >> 4) % CHANNEL_COUNT;
        let sample = byte & 1 != 0;
        if let Some(edge) = filter.update(index, sample) {
            assert_ne!(edge, last_edge[index], "edges must alternate");
            last_edge[index] = edge;
        }
    }
});
