use criterion::{Criterion, criterion_group, criterion_main};
use rstruct_tests::{flat_poly_header, point, poly_header, poly_header_bytes};
use rstruct_view::Structure;

fn bench_flat_access(c: &mut Criterion) {
    let schema = flat_poly_header();
    let bytes = poly_header_bytes(1, (2.2, 3.3), (4.4, 5.5), 6);

    c.bench_function("flat_get_value", |b| {
        b.iter(|| {
            let s = Structure::new(&schema, bytes.as_slice()).unwrap();
            s.get_value("num_polys").unwrap()
        });
    });
}

fn bench_nested_access(c: &mut Criterion) {
    let point = point();
    let schema = poly_header(&point);
    let bytes = poly_header_bytes(1, (2.2, 3.3), (4.4, 5.5), 6);

    let mut group = c.benchmark_group("nested_access");

    group.bench_function("fresh_view", |b| {
        b.iter(|| {
            let s = Structure::new(&schema, bytes.as_slice()).unwrap();
            s.get_nested("max").unwrap().get_value("y").unwrap()
        });
    });

    group.bench_function("memoized_child", |b| {
        let s = Structure::new(&schema, bytes.as_slice()).unwrap();
        b.iter(|| s.get_nested("max").unwrap().get_value("y").unwrap());
    });

    group.finish();
}

fn bench_writes(c: &mut Criterion) {
    let point = point();
    let schema = poly_header(&point);
    let mut bytes = vec![0u8; schema.total_size()];
    let s = Structure::writable(&schema, &mut bytes).unwrap();

    c.bench_function("nested_set", |b| {
        b.iter(|| s.get_nested("min").unwrap().set("x", 1.5f64).unwrap());
    });
}

criterion_group!(benches, bench_flat_access, bench_nested_access, bench_writes);
criterion_main!(benches);
