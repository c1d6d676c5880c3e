//! Build script for the device-info probe
//!
//! Links the COM library used by the system capture backend.

fn main() {
    // Only run on Windows
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }

    println!("cargo:rustc-link-lib=ole32");
}
