use chisel::cache::BuildCache;
use chisel::config::ChiselConfig;
use chisel::embed;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const MOCK_CONFIG: &str = r#"
[package]
name = "benchmark_project"

[build]
compiler = "clang"
cflags = ["-O2", "-Wall", "-Wextra"]
libs = ["m", "pthread"]
src_dirs = ["src", "src/util"]
"#;

fn populated_cache(entries: usize) -> BuildCache {
    let mut cache = BuildCache::new();
    for i in 0..entries {
        cache.set(&format!("src/file_{}.c", i), 1_700_000_000 + i as i64);
    }
    cache
}

fn bench_config_parse(c: &mut Criterion) {
    c.bench_function("parse_chisel_toml", |b| {
        b.iter(|| {
            let _: ChiselConfig = toml::from_str(black_box(MOCK_CONFIG)).unwrap();
        })
    });
}

fn bench_cache_ops(c: &mut Criterion) {
    c.bench_function("cache_set_1000", |b| {
        b.iter(|| populated_cache(black_box(1000)))
    });

    let cache = populated_cache(1000);
    c.bench_function("cache_get_hit_and_miss", |b| {
        b.iter(|| {
            let _ = cache.get(black_box("src/file_999.c"));
            let _ = cache.get(black_box("src/not_there.c"));
        })
    });
}

fn bench_cache_round_trip(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join(".chisel_cache");
    let cache = populated_cache(1000);

    c.bench_function("cache_save_load_1000", |b| {
        b.iter(|| {
            cache.save(black_box(&file)).unwrap();
            let _ = BuildCache::load(black_box(&file)).unwrap();
        })
    });
}

fn bench_embed_render(c: &mut Criterion) {
    let text: Vec<u8> = "int main(void) { return 0; } /* filler line */\n"
        .bytes()
        .cycle()
        .take(16 * 1024)
        .collect();

    c.bench_function("render_string_array_16k", |b| {
        b.iter(|| embed::render_string_array(black_box(&text)))
    });

    c.bench_function("render_byte_array_16k", |b| {
        b.iter(|| embed::render_byte_array(black_box(&text)))
    });
}

criterion_group!(
    benches,
    bench_config_parse,
    bench_cache_ops,
    bench_cache_round_trip,
    bench_embed_render
);
criterion_main!(benches);
