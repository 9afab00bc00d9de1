#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;

static GUARDS: Lazy<Vec<guard_envelope::Guard>> = Lazy::new(|| {
    guard_envelope::supported()
        .into_iter()
        .filter_map(|name| {
            let mut guard = guard_envelope::Guard::new(name);
            guard.set_key("fuzzing passphrase").ok()?;
            Some(guard)
        })
        .collect()
});

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let guard = &GUARDS[data[0] as usize % GUARDS.len()];
    if let Ok(token) = core::str::from_utf8(&data[1..]) {
        let _ = guard.decrypt(token);
    }
});
