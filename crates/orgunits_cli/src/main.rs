//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `orgunits_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("orgunits_core ping={}", orgunits_core::ping());
    println!("orgunits_core version={}", orgunits_core::core_version());
}
