use std::path::Path;

use anyhow::Result;
use axum::body::Bytes;
use tokio::fs;
use uuid::Uuid;

/// Write an uploaded image under the upload directory and return the
/// public `/uploads/...` path persisted on the product row.
pub async fn store_image(upload_dir: &str, original_name: &str, data: Bytes) -> Result<String> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin")
        .to_ascii_lowercase();

    let filename = format!("image-{}.{ext}", Uuid::new_v4());
    fs::create_dir_all(upload_dir).await?;
    fs::write(Path::new(upload_dir).join(&filename), &data).await?;

    Ok(format!("/uploads/{filename}"))
}
