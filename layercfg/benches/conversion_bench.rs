use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tempfile::TempDir;

use layercfg::{
    parse_duration, ConfigFile, ConfigManager, Converter, DynamicSlot, EnumType, MainConverter,
    MapEnvironment, Namespace, PropertySource, SchemaEntry, TypeDescriptor,
};

const ENTRY_COUNTS: &[usize] = &[10, 100, 500];

fn bench_durations(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_duration");

    group.bench_function("iso", |b| {
        b.iter(|| parse_duration(black_box("P2DT3H4M20.5S")));
    });

    group.bench_function("composite", |b| {
        b.iter(|| parse_duration(black_box("10hours20mins30secs500millis200micros100nanos")));
    });

    group.bench_function("malformed", |b| {
        b.iter(|| parse_duration(black_box("10hourss")));
    });

    group.finish();
}

fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let converter = MainConverter::default();
    let mut enums = BTreeMap::new();
    enums.insert(
        "Region".to_string(),
        EnumType::new("Region", ["EU", "NA", "ASIA", "OCEANIA", "AFRICA"]),
    );

    let cases = [
        ("int", "0x7FFF"),
        ("double", "1.25e3"),
        ("bool", "yes"),
        ("list<string>", "a, b, c, d, e, f, g, h"),
        ("set<int>", "9,3,7,1,3,9,5"),
        ("set<enum:Region>", "*"),
        ("array<duration>", "1hour, PT30S, 5mins"),
    ];

    for (text, literal) in cases {
        let ty = TypeDescriptor::parse(text, &enums).expect("valid type text");
        group.bench_with_input(BenchmarkId::new("from_literal", text), &ty, |b, ty| {
            b.iter(|| converter.from_literal(ty, black_box(literal)));
        });
    }

    group.finish();
}

fn bench_properties(c: &mut Criterion) {
    let mut group = c.benchmark_group("properties_parse");

    for &count in ENTRY_COUNTS {
        let text: String = (0..count)
            .map(|i| format!("# entry {i}\nKey{i} = value {i} \\\n    continued\n"))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &text, |b, text| {
            b.iter(|| PropertySource::parse("bench", black_box(text)));
        });
    }

    group.finish();
}

fn namespace(count: usize) -> Namespace {
    let mut file = ConfigFile::builder("bench");
    for i in 0..count {
        let slot = DynamicSlot::new(TypeDescriptor::Int);
        file = file.entry(SchemaEntry::dynamic(format!("Key{i}"), i.to_string(), &slot));
    }
    Namespace::builder("bench")
        .file(file.build().expect("valid bench file"))
        .build()
        .expect("valid bench namespace")
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_namespace");

    for &count in ENTRY_COUNTS {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let dir = TempDir::new().expect("failed to create temporary directory");
                    let manager = ConfigManager::builder()
                        .with_root(dir.path())
                        .with_environment(MapEnvironment::new())
                        .with_override_enabled(false)
                        .build();
                    manager
                        .register(namespace(count))
                        .expect("failed to register namespace");
                    // Generate the base file outside the measured pass
                    manager.load("bench").expect("failed to bootstrap namespace");
                    (dir, manager)
                },
                |(_dir, manager)| manager.reload("bench").expect("failed to reload"),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_durations,
    bench_conversion,
    bench_properties,
    bench_load
);
criterion_main!(benches);
