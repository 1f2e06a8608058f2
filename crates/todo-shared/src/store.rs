use std::collections::BTreeMap;
use std::fmt;

use anyhow::Context;
use tracing::{
  debug,
  warn
};

use crate::{
  CorruptDataPolicy,
  TodoOptions,
  default_tasks
};

/// A string-keyed persistent slot store,
/// shaped like the browser's
/// `localStorage`.
pub trait KeyValueStore {
  fn get_item(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>>;

  fn set_item(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()>;

  fn remove_item(
    &mut self,
    key: &str
  ) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub enum StoreError {
  Corrupt {
    key:    String,
    source: serde_json::Error
  }
}

impl fmt::Display for StoreError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | StoreError::Corrupt {
        key,
        source
      } => {
        write!(
          f,
          "stored tasks under `{key}` \
           are not a JSON array of \
           strings: {source}"
        )
      }
    }
  }
}

impl std::error::Error for StoreError {
  fn source(
    &self
  ) -> Option<&(dyn std::error::Error + 'static)>
  {
    match self {
      | StoreError::Corrupt {
        source,
        ..
      } => Some(source)
    }
  }
}

/// In-process store. Counts writes so
/// callers can observe skipped saves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  slots:  BTreeMap<String, String>,
  writes: usize
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_item(
    key: &str,
    value: &str
  ) -> Self {
    let mut store = Self::new();
    store
      .slots
      .insert(key.to_string(), value.to_string());
    store
  }

  pub fn write_count(&self) -> usize {
    self.writes
  }

  pub fn raw(
    &self,
    key: &str
  ) -> Option<&str> {
    self.slots.get(key).map(String::as_str)
  }
}

impl KeyValueStore for MemoryStore {
  fn get_item(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    Ok(self.slots.get(key).cloned())
  }

  fn set_item(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    self.writes += 1;
    self
      .slots
      .insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove_item(
    &mut self,
    key: &str
  ) -> anyhow::Result<()> {
    self.slots.remove(key);
    Ok(())
  }
}

/// The task list as a JSON array of
/// strings under one key.
#[derive(Debug, Clone)]
pub struct TaskStore<S> {
  backend: S,
  key:     String,
  policy:  CorruptDataPolicy
}

impl<S: KeyValueStore> TaskStore<S> {
  pub fn new(
    backend: S,
    key: impl Into<String>,
    policy: CorruptDataPolicy
  ) -> Self {
    Self {
      backend,
      key: key.into(),
      policy
    }
  }

  pub fn with_options(
    backend: S,
    options: &TodoOptions
  ) -> Self {
    Self::new(
      backend,
      options.storage_key.clone(),
      options.corrupt_data
    )
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn backend(&self) -> &S {
    &self.backend
  }

  /// Reads the stored list. A missing or
  /// empty slot yields the default tasks.
  #[tracing::instrument(skip(self), fields(key = %self.key))]
  pub fn load(
    &self
  ) -> anyhow::Result<Vec<String>> {
    let raw = self
      .backend
      .get_item(&self.key)
      .with_context(|| {
        format!(
          "failed to read stored tasks \
           under `{}`",
          self.key
        )
      })?;

    let Some(raw) =
      raw.filter(|raw| !raw.is_empty())
    else {
      debug!(
        "no stored tasks; using defaults"
      );
      return Ok(default_tasks());
    };

    match serde_json::from_str::<
      Vec<String>
    >(&raw)
    {
      | Ok(tasks) => {
        debug!(
          count = tasks.len(),
          "loaded stored tasks"
        );
        Ok(tasks)
      }
      | Err(source) => {
        match self.policy {
          | CorruptDataPolicy::FallbackToDefaults => {
            warn!(
              error = %source,
              "stored tasks are corrupt; \
               using defaults"
            );
            Ok(default_tasks())
          }
          | CorruptDataPolicy::Propagate => {
            Err(
              StoreError::Corrupt {
                key: self.key.clone(),
                source
              }
              .into()
            )
          }
        }
      }
    }
  }

  /// Overwrites the slot with the whole
  /// list.
  #[tracing::instrument(skip(self, tasks), fields(key = %self.key, count = tasks.len()))]
  pub fn save(
    &mut self,
    tasks: &[String]
  ) -> anyhow::Result<()> {
    let json =
      serde_json::to_string(tasks)
        .context(
          "failed to serialize tasks"
        )?;
    self
      .backend
      .set_item(&self.key, &json)
      .with_context(|| {
        format!(
          "failed to write stored tasks \
           under `{}`",
          self.key
        )
      })?;
    debug!("saved tasks");
    Ok(())
  }

  /// Drops the slot; the next load yields
  /// the defaults.
  #[tracing::instrument(skip(self), fields(key = %self.key))]
  pub fn clear(
    &mut self
  ) -> anyhow::Result<()> {
    self
      .backend
      .remove_item(&self.key)
      .with_context(|| {
        format!(
          "failed to remove stored tasks \
           under `{}`",
          self.key
        )
      })
  }
}
