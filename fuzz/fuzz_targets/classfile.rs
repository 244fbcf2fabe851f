#![no_main]

use libfuzzer_sys::fuzz_target;
use classscope::{ClassInfoBuilder, ClassReader};

fuzz_target!(|data: &[u8]| {
    let _ = ClassReader::class_name(data);
    if let Ok(reader) = ClassReader::new(data) {
        let mut builder = ClassInfoBuilder::standalone(true);
        if reader.accept(&mut |event| builder.visit(event)).is_ok() {
            let _ = builder.finish();
        }
    }
});
