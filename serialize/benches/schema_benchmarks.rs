#![allow(dead_code)]

use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use redlilium_serialize::{
    DeserializeContext, Introspect, SchemaBuilder, SchemaCache, SchemaSettings, SerializeContext,
    TypeRegistry,
};

// ---------------------------------------------------------------------------
// Helper types
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Default, Introspect)]
struct Material {
    #[schema(default = 0.5)]
    pub friction: f32,
    #[schema(default = 0.0)]
    pub restitution: f32,
}

#[derive(Clone, Default, Introspect)]
struct Body {
    #[schema(default = 1, alias = "weight")]
    pub mass: f32,
    #[schema(order = 0)]
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity_scale: f32,
    pub tags: Vec<String>,
    #[schema(nested)]
    pub material: Material,
    sleeping: bool,
}

fn cache(settings: SchemaSettings) -> SchemaCache {
    let registry = Arc::new(TypeRegistry::new());
    registry.register::<Body>();
    SchemaCache::new(registry, settings)
}

fn bodies(count: usize) -> Vec<Body> {
    (0..count)
        .map(|i| Body {
            mass: 1.0 + i as f32,
            tags: vec![format!("body_{i}")],
            ..Default::default()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Schema building
// ---------------------------------------------------------------------------

fn bench_build_schema(c: &mut Criterion) {
    let settings = SchemaSettings::default();
    let description = Body::describe();
    c.bench_function("build_schema", |b| {
        b.iter(|| black_box(SchemaBuilder::new(&settings).build(&description)));
    });
}

fn bench_cached_schema_lookup(c: &mut Criterion) {
    let cache = cache(SchemaSettings::default());
    let _ = cache.schema_of::<Body>();
    c.bench_function("cached_schema_lookup", |b| {
        b.iter(|| black_box(cache.schema_of::<Body>()));
    });
}

fn bench_member_lookup(c: &mut Criterion) {
    let cache = cache(SchemaSettings::default().with_case_insensitive_lookup(true));
    let Ok(schema) = cache.schema_of::<Body>() else {
        return;
    };
    c.bench_function("member_lookup_case_insensitive", |b| {
        b.iter(|| black_box(schema.try_member("WEIGHT")));
    });
}

// ---------------------------------------------------------------------------
// Object I/O
// ---------------------------------------------------------------------------

fn bench_write_1k(c: &mut Criterion) {
    let cache = cache(SchemaSettings::default().with_emit_default_values(false));
    let bodies = bodies(1_000);
    c.bench_function("write_1k_objects", |b| {
        let writer = SerializeContext::new(&cache);
        b.iter(|| {
            for body in &bodies {
                black_box(writer.write(body).ok());
            }
        });
    });
}

fn bench_write_read_1k(c: &mut Criterion) {
    let cache = cache(SchemaSettings::default());
    let writer = SerializeContext::new(&cache);
    let values: Vec<_> = bodies(1_000)
        .iter()
        .filter_map(|body| writer.write(body).ok())
        .collect();
    c.bench_function("read_1k_objects", |b| {
        b.iter_batched(
            || values.clone(),
            |values| {
                let reader = DeserializeContext::new(&cache);
                for value in values {
                    black_box(reader.read::<Body>(value).ok());
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_build_schema,
    bench_cached_schema_lookup,
    bench_member_lookup,
    bench_write_1k,
    bench_write_read_1k,
);
criterion_main!(benches);
