#![no_main]

use errclass::ExceptionValue;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(value) = text.parse::<ExceptionValue>() {
        let repr = format!("{:?}", value);
        assert_eq!(repr.parse::<ExceptionValue>(), Ok(value));
    }
});
