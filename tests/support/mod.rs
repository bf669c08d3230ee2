#![allow(dead_code)]

pub mod png_builder;
pub mod synthetic;

/// Route `log` output through the test harness. Set `RUST_LOG=debug` to see
/// chunk negotiation and rollbacks.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
