#![no_main]

use cbws_format::{tokenize, Group};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let groups = tokenize(data);

    // Tokenizing must be total and deterministic.
    let again = tokenize(data);
    for group in Group::ALL {
        let lhs: Vec<_> = groups.group(group).iter().map(|f| f.raw_bytes()).collect();
        let rhs: Vec<_> = again.group(group).iter().map(|f| f.raw_bytes()).collect();
        assert_eq!(lhs, rhs);
    }

    // No span is empty, and no byte is lost or invented beyond the three
    // structural pads.
    let mut span_bytes = 0;
    for group in Group::ALL {
        for function in groups.group(group) {
            assert!(!function.is_empty());
            span_bytes += function.len();
        }
    }
    assert!(span_bytes <= data.len());
});
