use ksb_core::{AssetError, AssetLoader, AssetSink};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// Fetches figure assets over HTTP. No timeout and no retry; a newer
/// request simply supersedes this one inside the engine.
pub struct FetchLoader;

impl AssetLoader for FetchLoader {
    fn load(&self, url: &str, sink: AssetSink) {
        let url = url.to_string();
        spawn_local(async move {
            let fetched = fetch_bytes(&url).await;
            sink.deliver(fetched);
        });
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AssetError> {
    let window = web::window().ok_or(AssetError::Unavailable)?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?
        .dyn_into::<web::Response>()
        .map_err(|_| AssetError::Fetch("not a Response".to_string()))?;
    if !resp.ok() {
        return Err(AssetError::Fetch(format!("HTTP {}", resp.status())));
    }
    let promise = resp
        .array_buffer()
        .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
    let buf = JsFuture::from(promise)
        .await
        .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}
