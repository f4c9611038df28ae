//! Benchmarks for line parsing and the network reducer.

use std::time::Instant;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slirc_client::{Line, Network, NetworkConfig};

/// Simple PING line
const SIMPLE_LINE: &str = "PING :irc.example.com";

/// Line with source
const SOURCE_LINE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// Line with IRCv3 tags
const TAGGED_LINE: &str = "@time=2023-01-01T00:00:00.000Z;msgid=abc123;+example/tag=value :nick!user@host PRIVMSG #channel :Hello with tags!";

/// Numeric response
const NUMERIC_LINE: &str = ":irc.server.net 001 nickname :Welcome to the IRC Network nickname!user@host";

/// Mode change touching ranks, a ban and a flag
const MODE_LINE: &str = ":op!o@host MODE #bench +ovb-m alice bob *!*@spam";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Line Parsing");

    for (name, raw) in [
        ("simple_ping", SIMPLE_LINE),
        ("with_source", SOURCE_LINE),
        ("with_tags", TAGGED_LINE),
        ("numeric", NUMERIC_LINE),
        ("mode", MODE_LINE),
    ] {
        group.bench_with_input(BenchmarkId::new("parse", name), raw, |b, raw| {
            b.iter(|| {
                let line = Line::parse(black_box(raw)).unwrap();
                black_box(line)
            })
        });
    }

    group.finish();
}

fn logged_in_network() -> Network {
    let mut network = Network::new(NetworkConfig {
        nick: "bench".into(),
        enable_ircv3: false,
        ..NetworkConfig::default()
    });
    let now = Instant::now();
    network.begin_connect();
    network.transport_connected(now);
    network.feed_line(":irc.example.com 001 bench :Welcome", now);
    network.feed_line(":bench!b@host JOIN #bench", now);
    network.feed_line(":irc.example.com 353 bench = #bench :@op alice bob carol", now);
    network.drain_events();
    network
}

fn benchmark_reducer(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reducer");
    let now = Instant::now();

    group.bench_function("privmsg", |b| {
        let mut network = logged_in_network();
        b.iter(|| {
            network.feed_line(black_box(SOURCE_LINE), now);
            black_box(network.drain_events())
        })
    });

    group.bench_function("mode_with_ranks", |b| {
        let mut network = logged_in_network();
        b.iter(|| {
            network.feed_line(black_box(MODE_LINE), now);
            network.feed_line(":op!o@host MODE #bench -ovb+m alice bob *!*@spam", now);
            black_box(network.drain_events())
        })
    });

    group.bench_function("join_part", |b| {
        let mut network = logged_in_network();
        b.iter(|| {
            network.feed_line(":dave!d@host JOIN #bench", now);
            network.feed_line(":dave!d@host PART #bench :bye", now);
            black_box(network.drain_events())
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_parsing, benchmark_reducer);

criterion_main!(benches);
