use std::{env, fs, path::PathBuf};

use forecast_api::openapi::ApiDocV1;
use utoipa::OpenApi;

/// Writes the OpenAPI document; the first argument overrides the output path.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi").join("forecast-api.v1.json"));

    let json = serde_json::to_string_pretty(&ApiDocV1::openapi())?;
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, json)?;

    println!("OpenAPI document written to {}", output_path.display());
    Ok(())
}
