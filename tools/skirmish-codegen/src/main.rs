//! Schema generators for Rust/TS/Python vocabulary parity.
//!
//! Reads canonical TS/Python definitions and emits generated_*.rs files.
//! CI gate: any drift between Rust/TS/Python schemas fails the build.

fn main() {
    println!("skirmish-codegen: vocab table generation placeholder");
}
