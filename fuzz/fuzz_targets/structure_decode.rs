#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rstruct_codec::CODEC_TABLE;
use rstruct_schema::{FieldSpec, Schema};
use rstruct_view::{Field, Structure};

// Fuzz target: schema compilation and field decoding.
//
// An arbitrary field list is compiled into an inner schema and an outer
// schema that embeds it, then every field is read from arbitrary bytes.
// Reads must never panic, and a buffer at least as long as the schema
// must decode every field.

#[derive(Debug, Arbitrary)]
struct FuzzField {
    code: u8,
    marker: u8,
    bytes_len: u8,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    inner: Vec<FuzzField>,
    outer_lead: Vec<FuzzField>,
    buf: Vec<u8>,
}

fn format_of(field: &FuzzField) -> String {
    let marker = ["", "<", ">", "!", "@"][usize::from(field.marker) % 5];
    let choice = usize::from(field.code) % (CODEC_TABLE.len() + 1);
    match CODEC_TABLE.get(choice) {
        Some((code, _)) => format!("{marker}{code}"),
        None => format!("{marker}{}s", field.bytes_len % 32),
    }
}

fn specs(prefix: &str, fields: &[FuzzField]) -> Vec<FieldSpec> {
    fields
        .iter()
        .take(24)
        .enumerate()
        .map(|(i, f)| FieldSpec::scalar(format_of(f), format!("{prefix}{i}")))
        .collect()
}

fn read_all(s: &Structure<'_>) {
    for (_, field) in s.fields() {
        match field.unwrap() {
            Field::Scalar(_) | Field::Tuple(_) => {}
            Field::Nested(child) => read_all(child),
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let inner = Schema::compile("Inner", &specs("i", &input.inner)).unwrap();
    let mut fields = specs("o", &input.outer_lead);
    fields.push(FieldSpec::nested(&inner, "nested"));
    let outer = Schema::compile("Outer", &fields).unwrap();

    match Structure::new(&outer, input.buf.as_slice()) {
        Ok(s) => read_all(&s),
        Err(_) => assert!(input.buf.len() < outer.total_size()),
    }
});
