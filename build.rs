//! Build script for the spytcli playlist migration tool.
//!
//! Copies the `.env.example` configuration template from the crate root into
//! the user's local data directory, next to the place where the application
//! looks for its `.env` file at runtime.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` to the platform-specific local data directory.
///
/// # File Operations
///
/// The template is copied to:
/// - Linux: `~/.local/share/spytcli/.env.example`
/// - macOS: `~/Library/Application Support/spytcli/.env.example`
/// - Windows: `%LOCALAPPDATA%/spytcli/.env.example`
///
/// A missing template only produces a cargo warning; directory creation or
/// write failures fail the build.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spytcli");
    fs::create_dir_all(&out_dir)?;

    if env_example_path.is_file() {
        let contents = fs::read_to_string(&env_example_path)?;
        fs::write(out_dir.join(".env.example"), contents)?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
    }

    Ok(())
}
