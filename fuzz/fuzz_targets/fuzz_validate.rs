#![no_main]
use libfuzzer_sys::fuzz_target;

use ftcal_check::{CheckOptions, CombinationMode};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(info) = ftcal_dsl::parse(s, "fuzz.txt") else {
        return;
    };
    for mode in [CombinationMode::Binned, CombinationMode::BinByBin] {
        for ignore_extended in [false, true] {
            let options = CheckOptions {
                mode,
                ignore_extended,
            };
            let _ = ftcal_check::validate(info.clone(), &options);
        }
    }
});
