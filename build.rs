use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Read version from VERSION file at the repo root
    let version = if let Ok(v) = env::var("FWIMG_VERSION") {
        // Use environment variable if set
        v
    } else {
        // Try to read from VERSION file
        let version_file = Path::new("VERSION");
        if version_file.exists() {
            fs::read_to_string(version_file)
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string())
                .trim()
                .to_string()
        } else {
            // Fallback to the manifest version
            env!("CARGO_PKG_VERSION").to_string()
        }
    };

    // Pass version to the build
    println!("cargo:rustc-env=FWIMG_VERSION={}", version);
    println!("cargo:rerun-if-changed=VERSION");
    println!("cargo:rerun-if-env-changed=FWIMG_VERSION");
}
