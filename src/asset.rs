use std::{collections::HashMap, fs, path::Path, sync::LazyLock};

const MANIFEST_PATH: &str = "static/generated/assets-manifest.json";

static MANIFEST: LazyLock<HashMap<String, String>> =
    LazyLock::new(|| load_manifest(Path::new(MANIFEST_PATH)));

fn load_manifest(path: &Path) -> HashMap<String, String> {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "asset manifest is malformed");
            HashMap::new()
        }),
        Err(_) => HashMap::new(),
    }
}

/// Versioned URL for a built asset. Falls back to `path` itself when the
/// manifest is missing or does not list it.
pub fn asset_url(path: &str) -> String {
    MANIFEST.get(path).cloned().unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_assets_resolve_to_themselves() {
        assert_eq!(asset_url("/assets/build/missing.css"), "/assets/build/missing.css");
    }

    #[test]
    fn manifest_maps_logical_paths() {
        let dir = std::env::temp_dir().join(format!("portfolio-assets-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("assets-manifest.json");
        fs::write(&path, r#"{"/assets/build/app.js":"/assets/build/app.js?v=abc123"}"#).unwrap();

        let manifest = load_manifest(&path);
        assert_eq!(
            manifest.get("/assets/build/app.js").map(String::as_str),
            Some("/assets/build/app.js?v=abc123")
        );
        assert!(load_manifest(&dir.join("absent.json")).is_empty());
        let _ = fs::remove_dir_all(&dir);
    }
}
