use anyhow::anyhow;
use todo_shared::KeyValueStore;
use wasm_bindgen::JsValue;

/// `window.localStorage` behind the shared
/// store contract.
#[derive(Debug, Clone)]
pub struct LocalStorage {
  storage: web_sys::Storage
}

impl LocalStorage {
  pub fn open() -> anyhow::Result<Self> {
    let window = web_sys::window()
      .ok_or_else(|| {
        anyhow!("no browser window")
      })?;
    let storage = window
      .local_storage()
      .map_err(js_error)?
      .ok_or_else(|| {
        anyhow!(
          "local storage is unavailable"
        )
      })?;

    Ok(Self {
      storage
    })
  }
}

impl KeyValueStore for LocalStorage {
  fn get_item(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    self
      .storage
      .get_item(key)
      .map_err(js_error)
  }

  fn set_item(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    self
      .storage
      .set_item(key, value)
      .map_err(js_error)
  }

  fn remove_item(
    &mut self,
    key: &str
  ) -> anyhow::Result<()> {
    self
      .storage
      .remove_item(key)
      .map_err(js_error)
  }
}

// JsValue is neither Send nor Sync, so keep
// only its debug rendering.
fn js_error(value: JsValue) -> anyhow::Error {
  anyhow!("{value:?}")
}
