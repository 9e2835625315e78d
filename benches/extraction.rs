use criterion::{black_box, criterion_group, criterion_main, Criterion};
use playlist_scraper::{is_blocked, parse_playlist, render_json, DEFAULT_BASE_URL};
use std::time::Duration;
use url::Url;

// Fast settings for all benchmarks
fn configure_fast_group(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_millis(500));
    group.sample_size(20);
}

fn synthetic_playlist(rows: usize) -> String {
    let mut html = String::from("<html><body><div role=\"grid\">");
    for i in 0..rows {
        html.push_str(&format!(
            r#"<div data-testid="tracklist-row" aria-rowindex="{i}">
                <div class="cover"><img src="/image/{i}.jpg"></div>
                <a href="/track/{i:022}"><div dir="auto">Track number {i}</div></a>
                <span><a href="/artist/a{i}">Artist {i}</a>, <a href="/artist/b{i}">Guest {i}</a></span>
                <a href="/album/al{i}">Album {i}</a>
            </div>"#
        ));
    }
    html.push_str("</div></body></html>");
    html
}

fn benchmark_parse_playlist(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_playlist");
    configure_fast_group(&mut group);

    let base = Url::parse(DEFAULT_BASE_URL).unwrap();
    for rows in [50, 500] {
        let html = synthetic_playlist(rows);
        group.bench_function(format!("{rows}_rows"), |b| {
            b.iter(|| {
                let parsed = parse_playlist(black_box(&html), &base).unwrap();
                black_box(parsed);
            });
        });
    }

    group.finish();
}

fn benchmark_block_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_detection");
    configure_fast_group(&mut group);

    let html = synthetic_playlist(500);
    group.bench_function("clean_page", |b| {
        b.iter(|| black_box(is_blocked(black_box(&html))));
    });

    group.finish();
}

fn benchmark_render_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_json");
    configure_fast_group(&mut group);

    let base = Url::parse(DEFAULT_BASE_URL).unwrap();
    let tracks = parse_playlist(&synthetic_playlist(500), &base).unwrap().tracks;
    group.bench_function("500_tracks", |b| {
        b.iter(|| black_box(render_json(black_box(&tracks)).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse_playlist,
    benchmark_block_detection,
    benchmark_render_json
);
criterion_main!(benches);
