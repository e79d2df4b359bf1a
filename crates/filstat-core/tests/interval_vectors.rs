//! Report interval vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use filstat_core::interval::parse_interval;

mod vector_loader;

#[test]
fn interval_vectors() {
    for v in vector_loader::load("intervals.json") {
        let res = parse_interval(&v.input);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let d = res.unwrap_or_else(|e| panic!("vector={}: {e}", v.description));
        let ex = v.expect.expect("missing expect block");
        assert_eq!(d.as_millis() as u64, ex["millis"].as_u64().unwrap(), "vector={}", v.description);
    }
}
