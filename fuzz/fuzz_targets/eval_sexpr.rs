#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(tree) = lispy::parser::parse(s) {
            let env = lispy::evaluator::create_global_env();
            let _ = lispy::evaluator::eval(&env, lispy::reader::read(&tree)).to_string();
        }
    }
});
