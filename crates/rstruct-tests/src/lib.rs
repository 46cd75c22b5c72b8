//! Shared fixtures for the rstruct integration tests and benches.
//!
//! | Fixture                  | Contents                                        |
//! |--------------------------|-------------------------------------------------|
//! | `point()`                | `Point { x: <d, y: d }`, 16 bytes               |
//! | `poly_header()`          | `file_code, min: Point, max: Point, num_polys`  |
//! | `flat_poly_header()`     | same 40 bytes as six flat scalars               |
//! | `golden/poly_header.bin` | `1, 2.2, 3.3, 4.4, 5.5, 6`                      |
//! | `golden/records.bin`     | three `<i` records: two ints, empty, two points |

use std::path::Path;
use std::sync::Arc;

use rstruct_schema::{FieldSpec, Schema};
use rstruct_view::{RecordConfig, SizedRecord};

pub fn point() -> Arc<Schema> {
    Schema::compile("Point", &[FieldSpec::scalar("<d", "x"), FieldSpec::scalar("d", "y")])
        .expect("Point compiles")
}

/// The 40-byte polygon file header with nested bounding-box corners.
pub fn poly_header(point: &Arc<Schema>) -> Arc<Schema> {
    Schema::compile(
        "PolyHeader",
        &[
            FieldSpec::scalar("<i", "file_code"),
            FieldSpec::nested(point, "min"),
            FieldSpec::nested(point, "max"),
            FieldSpec::scalar("i", "num_polys"),
        ],
    )
    .expect("PolyHeader compiles")
}

/// The same header with the corners spelled out as scalars.
pub fn flat_poly_header() -> Arc<Schema> {
    Schema::compile(
        "FlatPolyHeader",
        &[
            FieldSpec::scalar("<i", "file_code"),
            FieldSpec::scalar("d", "min_x"),
            FieldSpec::scalar("d", "min_y"),
            FieldSpec::scalar("d", "max_x"),
            FieldSpec::scalar("d", "max_y"),
            FieldSpec::scalar("i", "num_polys"),
        ],
    )
    .expect("FlatPolyHeader compiles")
}

/// Encode a polygon header the way a writer of the file format would.
pub fn poly_header_bytes(file_code: i32, min: (f64, f64), max: (f64, f64), num_polys: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(40);
    out.extend_from_slice(&file_code.to_le_bytes());
    for v in [min.0, min.1, max.0, max.1] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&num_polys.to_le_bytes());
    out
}

/// Frame each body as a sized record under `config`.
pub fn framed(bodies: &[&[u8]], config: &RecordConfig) -> Vec<u8> {
    let mut out = Vec::new();
    for body in bodies {
        SizedRecord::new(body.to_vec())
            .write_to(&mut out, config)
            .expect("body fits the size format");
    }
    out
}

/// Read a committed fixture from `tests/golden/`.
pub fn golden(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/golden").join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("failed to read golden fixture {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_header_matches_encoder() {
        assert_eq!(golden("poly_header.bin"), poly_header_bytes(1, (2.2, 3.3), (4.4, 5.5), 6));
    }
}
