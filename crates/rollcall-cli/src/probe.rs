//! `rollcall probe`: upload one image and print what the service says.

use std::path::Path;

use anyhow::{Context, Result};
use rollcall_client::{HttpRecognitionService, RecognitionService};
use rollcall_core::frame::encode_jpeg;
use rollcall_session::Config;

pub fn run(config: &Config, image_path: &Path) -> Result<()> {
    // Uploads always use the session JPEG settings, whatever the input format
    let frame = image::open(image_path)
        .with_context(|| format!("failed to read {}", image_path.display()))?
        .to_rgb8();
    let jpeg = encode_jpeg(Some(&frame), config.jpeg_quality)?;

    let service = HttpRecognitionService::new(config.endpoint.clone(), config.request_timeout());
    let verdict = service
        .recognize(&jpeg)
        .with_context(|| format!("request to {} failed", service.endpoint()))?;

    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}
