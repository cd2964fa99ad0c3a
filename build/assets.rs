use anyhow::Result;
use minifier::{css::minify as minify_css, js::minify as minify_js};
use std::{collections::BTreeMap, fs, path::PathBuf};

const CSS_FILES: [&str; 1] = ["site.css"];
const JS_FILES: [&str; 1] = ["app.js"];

/// Minify page assets into `static/build` and record their versioned URLs in
/// `static/generated/assets-manifest.json`.
pub fn minify_assets(version: &str) -> Result<()> {
    let out_dir = PathBuf::from("static/build");
    fs::create_dir_all(&out_dir)?;
    let mut manifest = BTreeMap::new();

    for file in CSS_FILES {
        let src = PathBuf::from("static").join(file);
        if !src.exists() {
            continue;
        }
        let content = fs::read_to_string(&src)?;
        let min = minify_css(&content)
            .map(|m| m.to_string())
            .unwrap_or_else(|_| content.clone());
        fs::write(out_dir.join(file), min)?;
        manifest.insert(asset_path(file), versioned(file, version));
    }

    for file in JS_FILES {
        let src = PathBuf::from("static").join(file);
        if !src.exists() {
            continue;
        }
        let content = fs::read_to_string(&src)?;
        fs::write(out_dir.join(file), minify_js(&content).to_string())?;
        manifest.insert(asset_path(file), versioned(file, version));
    }

    let generated = PathBuf::from("static/generated");
    fs::create_dir_all(&generated)?;
    fs::write(
        generated.join("assets-manifest.json"),
        serde_json::to_string_pretty(&manifest)?,
    )?;
    Ok(())
}

fn asset_path(file: &str) -> String {
    format!("/assets/build/{file}")
}

fn versioned(file: &str, version: &str) -> String {
    format!("{}?v={version}", asset_path(file))
}
