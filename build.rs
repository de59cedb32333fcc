// Copyright © 2024 NoteFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build script for NoteFlow.
//!
//! Fails early with a readable message when the compiler is older than the
//! minimum supported Rust version declared in `Cargo.toml`.

use std::process;

/// Minimum supported Rust version, kept in sync with `rust-version`.
const MIN_RUSTC_VERSION: &str = "1.74.0";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    match version_check::is_min_version(MIN_RUSTC_VERSION) {
        Some(true) => {}
        Some(false) => {
            eprintln!(
                "NoteFlow requires rustc {} or newer.",
                MIN_RUSTC_VERSION
            );
            process::exit(1);
        }
        None => {
            println!(
                "cargo:warning=Unable to determine the rustc version."
            );
        }
    }
}
