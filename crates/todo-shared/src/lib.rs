//! Task list model, storage contract and list
//! controller shared by the browser front end
//! and the command line.

pub mod controller;
pub mod store;
pub mod task_list;

use serde::{
  Deserialize,
  Serialize
};

pub use controller::{
  EditKeyAction,
  EditOutcome,
  SubmitOutcome,
  TodoController
};
pub use store::{
  KeyValueStore,
  MemoryStore,
  StoreError,
  TaskStore
};
pub use task_list::{
  ItemId,
  TaskItem,
  TaskList
};

pub const STORAGE_KEY: &str = "todoData";

pub const EMPTY_MESSAGE: &str =
  "No tasks yet";

pub const DEFAULT_TASKS: [&str; 6] = [
  "Review pending items",
  "Respond to messages",
  "Work on priority tasks",
  "Take a short break",
  "Do something active",
  "Watch something for fun"
];

pub fn default_tasks() -> Vec<String> {
  DEFAULT_TASKS
    .iter()
    .map(|task| task.to_string())
    .collect()
}

/// What `load` does with a stored value
/// that is not a JSON array of strings.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub enum CorruptDataPolicy {
  #[default]
  FallbackToDefaults,
  Propagate
}

/// Whether leaving an edit writes the list
/// when nothing changed.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub enum EditCommitPolicy {
  #[default]
  SkipUnchanged,
  Always
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TodoOptions {
  pub storage_key:      String,
  #[serde(default)]
  pub corrupt_data:     CorruptDataPolicy,
  #[serde(default)]
  pub edit_commit:      EditCommitPolicy,
  #[serde(default = "default_true")]
  pub show_empty_state: bool,
  #[serde(
    default = "default_empty_message"
  )]
  pub empty_message:    String
}

impl Default for TodoOptions {
  fn default() -> Self {
    Self {
      storage_key:      STORAGE_KEY
        .to_string(),
      corrupt_data:
        CorruptDataPolicy::default(),
      edit_commit:
        EditCommitPolicy::default(),
      show_empty_state: true,
      empty_message:
        default_empty_message()
    }
  }
}

fn default_true() -> bool {
  true
}

fn default_empty_message() -> String {
  EMPTY_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_tasks_are_the_six_samples()
  {
    let tasks = default_tasks();
    assert_eq!(tasks.len(), 6);
    assert_eq!(
      tasks.first().map(String::as_str),
      Some("Review pending items")
    );
    assert_eq!(
      tasks.last().map(String::as_str),
      Some("Watch something for fun")
    );
  }

  #[test]
  fn options_fill_missing_fields() {
    let options: TodoOptions =
      serde_json::from_str(
        r#"{"storage_key":"custom"}"#
      )
      .expect("options should parse");

    assert_eq!(
      options.storage_key,
      "custom"
    );
    assert_eq!(
      options.corrupt_data,
      CorruptDataPolicy::FallbackToDefaults
    );
    assert_eq!(
      options.edit_commit,
      EditCommitPolicy::SkipUnchanged
    );
    assert!(options.show_empty_state);
    assert_eq!(
      options.empty_message,
      EMPTY_MESSAGE
    );
  }
}
