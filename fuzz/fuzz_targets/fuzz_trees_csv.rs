#![no_main]

use libfuzzer_sys::fuzz_target;
use tree_estimator::io::read_trees_csv_from_bytes;

fuzz_target!(|data: &[u8]| {
    if let Ok(trees) = read_trees_csv_from_bytes(data) {
        for tree in &trees {
            let _ = tree.validate();
        }
    }
});
