#![no_main]

use libfuzzer_sys::fuzz_target;
use wright_rle::decode;

fuzz_target!(|data: &[u8]| {
    // Decoder should never panic on any input
    let _ = decode(data);
});
