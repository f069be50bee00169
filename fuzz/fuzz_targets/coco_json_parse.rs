//! Fuzz target for COCO annotation file parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse
//!
//! Or with a corpus:
//!   cargo +nightly fuzz run coco_json_parse fuzz/corpus/coco_json_parse/

#![no_main]

use libfuzzer_sys::fuzz_target;
use cocoslice::ir::io_coco_json::{from_coco_slice, ReducedCoco};

fuzz_target!(|data: &[u8]| {
    // 10MB is generous for annotation files.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(coco) = from_coco_slice(data) else {
        return;
    };

    // Anything that parses must serialize back without panicking.
    let _ = ReducedCoco::new(coco.annotations.iter().collect()).to_json_string();
});
