use std::sync::Arc;

use bytecraft::{
    builder::SchemaBuilder,
    field::ArrayCount,
    primitive::PrimitiveKind,
    schema::Schema,
    stream::{Reader, Writer},
};
use criterion::{Criterion, criterion_group, criterion_main};

fn gen_schema(field_count: usize) -> Arc<Schema> {
    let mut builder = SchemaBuilder::new("Bench");

    for i in 0..field_count {
        let kind = PrimitiveKind::ALL[i % PrimitiveKind::ALL.len()];
        builder = builder.primitive(format!("f{}", i), kind);
    }

    builder.build().unwrap()
}

fn gen_packet(total_bytes: usize) -> Vec<u8> {
    // Deterministic but non-trivial pattern
    (0..total_bytes).map(|i| (i * 31 % 256) as u8).collect()
}

fn bench_schema_parse(c: &mut Criterion) {
    for &field_count in &[1usize, 10, 50, 100] {
        let schema = gen_schema(field_count);
        let packet = gen_packet(schema.static_size());

        c.bench_function(&format!("parse_{}_fields", field_count), |b| {
            b.iter(|| {
                let _ = schema.parse(&mut Reader::from_slice(&packet)).unwrap();
            })
        });
    }
}

fn bench_exhaustion_array(c: &mut Criterion) {
    let pixel = SchemaBuilder::new("Pixel")
        .primitive("blue", PrimitiveKind::U8)
        .primitive("green", PrimitiveKind::U8)
        .primitive("red", PrimitiveKind::U8)
        .build()
        .unwrap();
    let schema = SchemaBuilder::new("Pixels")
        .array("pixels", pixel, ArrayCount::UntilExhausted)
        .build()
        .unwrap();
    let packet = gen_packet(3 * 1024);

    c.bench_function("parse_1024_pixels", |b| {
        b.iter(|| {
            let _ = schema.parse(&mut Reader::from_slice(&packet)).unwrap();
        })
    });

    let record = schema.parse(&mut Reader::from_slice(&packet)).unwrap();
    c.bench_function("dump_1024_pixels", |b| {
        b.iter(|| {
            let mut writer = Writer::in_memory();
            record.dump(&mut writer).unwrap();
        })
    });
}

criterion_group!(benches, bench_schema_parse, bench_exhaustion_array);
criterion_main!(benches);
