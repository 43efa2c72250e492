//! Rust project fixtures for partition tests.

use std::path::Path;

/// Top-level manifest of a freshly generated Rust port.
pub const RUST_TEMPLATE: &str = r#"[package]
name = "app"
version = "0.1.0"
edition = "2021"

[lib]
path = "lib.rs"
crate-type = ["staticlib"]

[[bin]]
name = "app"
path = "src/main.rs"

[dependencies]
libc = "0.2"
"#;

/// Write a Rust project `partition` can scaffold from: the manifest,
/// `src/main.rs`, `lib.rs` and `c_lib.rs`. `stdio.rs` is left out.
pub fn write_rust_project(root: &Path) {
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::write(root.join("Cargo.toml"), RUST_TEMPLATE).unwrap();
    std::fs::write(root.join("src/main.rs"), "fn main() {}\n").unwrap();
    std::fs::write(root.join("lib.rs"), "pub mod c_lib;\n").unwrap();
    std::fs::write(root.join("c_lib.rs"), "pub use libc::*;\n").unwrap();
}
