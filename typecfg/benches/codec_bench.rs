use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use typecfg::{Configuration, Format, IoOptions, PropertyDefinition, ReadPolicy, TypedValue, ValueTag};

fn schema(size: usize) -> Configuration {
    let mut builder = Configuration::builder();
    builder.name("bench").version("1").filename("bench.cfg");
    for i in 0..size {
        let value: TypedValue = match i % 4 {
            0 => TypedValue::from(i32::try_from(i).unwrap_or(i32::MAX)),
            1 => TypedValue::from(format!("value number {i}, with; delimiters")),
            2 => TypedValue::from(vec![1.5_f64, -2.25, 1e10]),
            _ => TypedValue::from(vec!["a", "b,c", "\"quoted\""]),
        };
        builder
            .put(
                PropertyDefinition::builder(format!("key_{i}"))
                    .value(value)
                    .description("benchmark property")
                    .build()
                    .unwrap(),
            )
            .unwrap();
    }
    builder.build().unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let config = schema(200);
    let options = IoOptions::default();

    for format in Format::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(format), &format, |b, format| {
            b.iter(|| format.encode(black_box(&config), &options).unwrap());
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let config = schema(200);
    let options = IoOptions::default();

    for format in Format::ALL {
        let encoded = format.encode(&config, &options).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(format), &encoded, |b, encoded| {
            b.iter(|| {
                format
                    .decode(&config, black_box(encoded), ReadPolicy::Strict)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_text_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_values");

    // Benchmark canonical rendering of a string array
    let strings = TypedValue::from(vec!["plain", "with, comma", "with \"quotes\"", ""]);
    group.bench_function("render_string_array", |b| {
        b.iter(|| black_box(&strings).to_text());
    });

    // Benchmark parsing the same array back
    let text = strings.to_text();
    group.bench_function("parse_string_array", |b| {
        b.iter(|| TypedValue::parse_text(ValueTag::StringArray, black_box(&text)).unwrap());
    });

    // Benchmark range-checked integer parsing
    group.bench_function("parse_byte", |b| {
        b.iter(|| TypedValue::parse_text(ValueTag::Byte, black_box("-128")).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_text_values);
criterion_main!(benches);
