//! Fuzz target for line parsing and dispatch
//!
//! Feeds arbitrary bytes to the parser and to a logged-in network. Neither
//! may panic; bad input must surface as events.

#![no_main]

use std::time::Instant;

use libfuzzer_sys::fuzz_target;
use slirc_client::{Line, Network, NetworkConfig};

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 {
        return;
    }

    if let Ok(input) = std::str::from_utf8(data) {
        let _ = Line::parse(input);
    }

    let mut network = Network::new(NetworkConfig {
        nick: "fuzz".into(),
        enable_ircv3: false,
        ..NetworkConfig::default()
    });
    let now = Instant::now();
    network.begin_connect();
    network.transport_connected(now);
    network.feed_line(":irc 001 fuzz :hi", now);
    network.feed_line(":fuzz!f@h JOIN #fuzz", now);
    for line in data.split(|b| *b == b'\n') {
        network.feed_bytes(line, now);
    }
    let _ = network.drain_events();
});
