//! Model fetch. Only the container's bounds are used, so the bytes are
//! parsed for metadata and then dropped.

use crate::constants::MODEL_MAX_BYTES;
use folio_core::{glb_bounds, Aabb, AssetError};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

async fn fetch_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let resp: web::Response = resp
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("not a Response: {:?}", e))?;
    if !resp.ok() {
        anyhow::bail!("HTTP {} for {}", resp.status(), url);
    }
    let buf = JsFuture::from(resp.array_buffer().map_err(|e| anyhow::anyhow!("{:?}", e))?)
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let bytes = js_sys::Uint8Array::new(&buf);
    let len = bytes.length() as usize;
    if len > MODEL_MAX_BYTES {
        anyhow::bail!("{} is {} bytes, limit {}", url, len, MODEL_MAX_BYTES);
    }
    Ok(bytes.to_vec())
}

/// Fetch `url` and read its model-space bounds.
pub async fn load_bounds(url: &str) -> Result<Aabb, AssetError> {
    let bytes = fetch_bytes(url)
        .await
        .map_err(|e| AssetError::Fetch(e.to_string()))?;
    glb_bounds(&bytes)
}
