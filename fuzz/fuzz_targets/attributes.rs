#![no_main]

use cbws_format::{AttributeDecoder, Catalog, Function};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let catalog = Catalog::builtin();
    let function = Function::new(data.to_vec());
    let attrs = AttributeDecoder::new(&catalog).decode(&function);

    // Offsets are sorted and inside the span.
    assert!(attrs.windows(2).all(|w| w[0].byte_offset <= w[1].byte_offset));
    for attr in &attrs {
        assert!(attr.byte_offset <= function.len());
    }
});
