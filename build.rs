use anyhow::Result;

#[path = "build/assets.rs"]
mod assets;

fn main() -> Result<()> {
    if is_rust_analyzer() {
        println!("cargo:rustc-env=GIT_HASH=dev");
        return Ok(());
    }

    // exposed for ETags and asset versioning
    let git_hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_HASH={git_hash}");

    println!("cargo:rerun-if-changed=static/site.css");
    println!("cargo:rerun-if-changed=static/app.js");
    println!("cargo:rerun-if-changed=.git/HEAD");

    assets::minify_assets(&git_hash)?;
    Ok(())
}

fn is_rust_analyzer() -> bool {
    std::env::var("RUST_ANALYZER").is_ok()
        || std::env::var("RUST_ANALYZER_INTERNALS_DO_NOT_USE").is_ok()
        || std::env::var("RA_RUNNING").is_ok()
}
