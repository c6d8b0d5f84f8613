#![no_main]

use errclass::{ErrorCode, ErrorRegistry, InProcessRuntime, RegistryConfig};
use libfuzzer_sys::fuzz_target;

const MAX_OPS: usize = 256;

fuzz_target!(|data: &[u8]| {
    let config = RegistryConfig::default().with_journal_capacity(16);
    let mut registry = ErrorRegistry::with_config(InProcessRuntime::new(), config);
    let mut last = registry.last_used_code();

    for chunk in data.chunks(4).take(MAX_OPS) {
        let op = chunk[0] % 4;
        let raw = chunk.iter().skip(1).fold(0i32, |acc, b| (acc << 8) | i32::from(*b));
        let code = ErrorCode::new(raw % 128);

        let allocated = match op {
            0 => registry.allocate_class().ok(),
            1 => registry.allocate_code(code).ok(),
            2 => {
                let text = String::from_utf8_lossy(&chunk[1..]).into_owned();
                let _ = registry.set_string(code, text);
                None
            }
            _ => {
                let _ = registry.classify(code);
                let _ = registry.get_string(code);
                None
            }
        };

        if let Some(value) = allocated {
            assert!(value > last);
            last = value;
        }
        assert_eq!(registry.last_used_code(), last);
    }
});
