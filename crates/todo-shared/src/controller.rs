use tracing::{
  debug,
  info
};

use crate::store::{
  KeyValueStore,
  TaskStore
};
use crate::task_list::{
  ItemId,
  TaskItem,
  TaskList
};
use crate::{
  EditCommitPolicy,
  TodoOptions
};

/// Key that ends an edit instead of
/// inserting a newline.
pub const CONFIRM_KEY: &str = "Enter";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum SubmitOutcome {
  /// Blank input. Nothing changed and the
  /// input keeps its value.
  Rejected,
  Added(ItemId)
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum EditKeyAction {
  Continue,
  /// Suppress the key and leave the text
  /// region.
  Finish
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum EditOutcome {
  Saved,
  Unchanged,
  Missing
}

/// Owns the canonical task list. Every
/// mutation changes the list first, then
/// saves it. A failed save puts the list
/// back, so what is shown always matches
/// the last successful save.
#[derive(Debug, Clone)]
pub struct TodoController<S> {
  store:               TaskStore<S>,
  list:                TaskList,
  options:             TodoOptions,
  editing:             Option<ItemId>,
  placeholder_visible: bool
}

impl<S: KeyValueStore> TodoController<S> {
  /// Loads the stored list and lays it out
  /// in stored order.
  #[tracing::instrument(skip_all)]
  pub fn init(
    backend: S,
    options: TodoOptions
  ) -> anyhow::Result<Self> {
    let store = TaskStore::with_options(
      backend, &options
    );
    let tasks = store.load()?;
    let list = TaskList::from_texts(tasks);

    let mut controller = Self {
      store,
      list,
      options,
      editing: None,
      placeholder_visible: false
    };
    controller.refresh_empty_state();

    info!(
      count = controller.list.len(),
      "task list ready"
    );
    Ok(controller)
  }

  /// Adds trimmed input at the top of the
  /// list. Blank input is ignored.
  #[tracing::instrument(skip(self, input))]
  pub fn submit(
    &mut self,
    input: &str
  ) -> anyhow::Result<SubmitOutcome> {
    let text = input.trim();
    if text.is_empty() {
      debug!("ignoring blank task");
      return Ok(SubmitOutcome::Rejected);
    }

    let previous = self.list.clone();
    let id =
      self.list.prepend(text.to_string());
    self.commit(previous)?;
    debug!(%id, "task added");
    Ok(SubmitOutcome::Added(id))
  }

  #[tracing::instrument(skip(self))]
  pub fn delete(
    &mut self,
    id: ItemId
  ) -> anyhow::Result<bool> {
    let previous = self.list.clone();
    if self.list.remove(id).is_none() {
      debug!("delete of unknown task");
      return Ok(false);
    }

    self.commit(previous)?;
    if self.editing == Some(id) {
      self.editing = None;
    }
    Ok(true)
  }

  #[tracing::instrument(skip(self))]
  pub fn duplicate(
    &mut self,
    id: ItemId
  ) -> anyhow::Result<Option<ItemId>> {
    let previous = self.list.clone();
    let Some(copy) =
      self.list.duplicate(id)
    else {
      debug!(
        "duplicate of unknown task"
      );
      return Ok(None);
    };

    self.commit(previous)?;
    Ok(Some(copy))
  }

  /// Makes the item's text editable.
  /// Returns false for an unknown id.
  pub fn begin_edit(
    &mut self,
    id: ItemId
  ) -> bool {
    if self.list.get(id).is_none() {
      return false;
    }
    self.editing = Some(id);
    true
  }

  pub fn edit_key(
    &self,
    id: ItemId,
    key: &str
  ) -> EditKeyAction {
    if self.editing == Some(id)
      && key == CONFIRM_KEY
    {
      EditKeyAction::Finish
    } else {
      EditKeyAction::Continue
    }
  }

  /// Leaves editing with the text as
  /// typed. The list is compared with the
  /// stored snapshot before writing unless
  /// every commit must write. Editing ends
  /// even when the save fails.
  #[tracing::instrument(skip(self, text))]
  pub fn finish_edit(
    &mut self,
    id: ItemId,
    text: &str
  ) -> anyhow::Result<EditOutcome> {
    if self.editing == Some(id) {
      self.editing = None;
    }
    let Some(previous) = self
      .list
      .set_text(id, text.to_string())
    else {
      return Ok(EditOutcome::Missing);
    };

    let outcome = self.save_edit();
    if outcome.is_err() {
      self.list.set_text(id, previous);
    }
    outcome
  }

  fn save_edit(
    &mut self
  ) -> anyhow::Result<EditOutcome> {
    let current = self.list.texts();
    if self.options.edit_commit
      == EditCommitPolicy::SkipUnchanged
      && self.store.load()? == current
    {
      debug!(
        "edit left the list unchanged"
      );
      return Ok(EditOutcome::Unchanged);
    }

    self.store.save(&current)?;
    Ok(EditOutcome::Saved)
  }

  pub fn tasks(&self) -> Vec<String> {
    self.list.texts()
  }

  pub fn items(&self) -> &[TaskItem] {
    self.list.items()
  }

  pub fn item(
    &self,
    id: ItemId
  ) -> Option<&TaskItem> {
    self.list.get(id)
  }

  /// Id of the task shown at `index`
  /// (zero-based).
  pub fn id_at(
    &self,
    index: usize
  ) -> Option<ItemId> {
    self.list.id_at(index)
  }

  pub fn is_editing(
    &self,
    id: ItemId
  ) -> bool {
    self.editing == Some(id)
  }

  pub fn editing(&self) -> Option<ItemId> {
    self.editing
  }

  pub fn placeholder_visible(&self) -> bool {
    self.placeholder_visible
  }

  pub fn empty_message(&self) -> &str {
    &self.options.empty_message
  }

  pub fn options(&self) -> &TodoOptions {
    &self.options
  }

  pub fn store(&self) -> &TaskStore<S> {
    &self.store
  }

  pub fn len(&self) -> usize {
    self.list.len()
  }

  pub fn is_empty(&self) -> bool {
    self.list.is_empty()
  }

  /// Saves the list, or restores
  /// `previous` when the save fails.
  fn commit(
    &mut self,
    previous: TaskList
  ) -> anyhow::Result<()> {
    let tasks = self.list.texts();
    if let Err(error) =
      self.store.save(&tasks)
    {
      self.list = previous;
      return Err(error);
    }
    self.refresh_empty_state();
    Ok(())
  }

  fn refresh_empty_state(&mut self) {
    self.placeholder_visible = self
      .options
      .show_empty_state
      && self.list.is_empty();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryStore;
  use crate::{
    DEFAULT_TASKS,
    STORAGE_KEY
  };

  fn controller_with(
    tasks: &[&str]
  ) -> TodoController<MemoryStore> {
    let json = serde_json::to_string(tasks)
      .expect("serialize");
    TodoController::init(
      MemoryStore::with_item(
        STORAGE_KEY,
        &json
      ),
      TodoOptions::default()
    )
    .expect("init")
  }

  /// Serves reads but refuses every
  /// write.
  #[derive(Debug, Clone)]
  struct ReadOnlyStore(MemoryStore);

  impl KeyValueStore for ReadOnlyStore {
    fn get_item(
      &self,
      key: &str
    ) -> anyhow::Result<Option<String>> {
      self.0.get_item(key)
    }

    fn set_item(
      &mut self,
      _key: &str,
      _value: &str
    ) -> anyhow::Result<()> {
      Err(anyhow::anyhow!("storage is full"))
    }

    fn remove_item(
      &mut self,
      _key: &str
    ) -> anyhow::Result<()> {
      Err(anyhow::anyhow!("storage is full"))
    }
  }

  fn read_only(
    tasks: &str
  ) -> TodoController<ReadOnlyStore> {
    TodoController::init(
      ReadOnlyStore(MemoryStore::with_item(
        STORAGE_KEY,
        tasks
      )),
      TodoOptions::default()
    )
    .expect("init")
  }

  fn stored(
    controller: &TodoController<MemoryStore>
  ) -> Vec<String> {
    controller
      .store()
      .load()
      .expect("load stored tasks")
  }

  #[test]
  fn init_uses_defaults_without_writing() {
    let controller = TodoController::init(
      MemoryStore::new(),
      TodoOptions::default()
    )
    .expect("init");

    assert_eq!(
      controller.tasks(),
      DEFAULT_TASKS
    );
    assert!(!controller.placeholder_visible());
    assert_eq!(
      controller
        .store()
        .backend()
        .write_count(),
      0
    );
  }

  #[test]
  fn init_of_empty_list_shows_placeholder()
  {
    let controller = controller_with(&[]);
    assert!(controller.is_empty());
    assert!(controller.placeholder_visible());
  }

  #[test]
  fn submit_trims_and_prepends() {
    let mut controller =
      controller_with(&["a"]);

    let outcome = controller
      .submit("  new task \n")
      .expect("submit");

    assert!(matches!(
      outcome,
      SubmitOutcome::Added(_)
    ));
    assert_eq!(
      controller.tasks(),
      ["new task", "a"]
    );
    assert_eq!(
      stored(&controller),
      controller.tasks()
    );
  }

  #[test]
  fn submit_rejects_blank_input() {
    let mut controller =
      controller_with(&["a"]);

    for input in ["", "   ", "\t\n"] {
      assert_eq!(
        controller
          .submit(input)
          .expect("submit"),
        SubmitOutcome::Rejected
      );
    }

    assert_eq!(controller.tasks(), ["a"]);
    assert_eq!(
      controller
        .store()
        .backend()
        .write_count(),
      0
    );
  }

  #[test]
  fn duplicate_inserts_at_front_and_saves()
  {
    let mut controller =
      controller_with(&["A", "B"]);
    let b = controller.id_at(1).expect("B");

    let copy = controller
      .duplicate(b)
      .expect("duplicate")
      .expect("B exists");

    assert_eq!(
      controller.tasks(),
      ["B", "A", "B"]
    );
    assert_eq!(
      controller.id_at(0),
      Some(copy)
    );
    assert_eq!(
      stored(&controller),
      ["B", "A", "B"]
    );
  }

  #[test]
  fn delete_removes_one_occurrence() {
    let mut controller =
      controller_with(&["A", "B", "A"]);
    let first = controller.id_at(0).expect("A");

    assert!(
      controller.delete(first).expect("delete")
    );

    assert_eq!(controller.tasks(), ["B", "A"]);
    assert_eq!(
      stored(&controller),
      ["B", "A"]
    );
  }

  #[test]
  fn unknown_ids_do_not_persist() {
    let mut controller =
      controller_with(&["A"]);
    let stranger = uuid::Uuid::new_v4();

    assert!(
      !controller
        .delete(stranger)
        .expect("delete")
    );
    assert!(
      controller
        .duplicate(stranger)
        .expect("duplicate")
        .is_none()
    );
    assert!(!controller.begin_edit(stranger));
    assert_eq!(
      controller
        .finish_edit(stranger, "x")
        .expect("finish"),
      EditOutcome::Missing
    );
    assert_eq!(
      controller
        .store()
        .backend()
        .write_count(),
      0
    );
  }

  #[test]
  fn placeholder_follows_structural_changes()
  {
    let mut controller =
      controller_with(&["only"]);
    let only =
      controller.id_at(0).expect("only");

    controller.delete(only).expect("delete");
    assert!(controller.placeholder_visible());

    controller
      .submit("back again")
      .expect("submit");
    assert!(!controller.placeholder_visible());
  }

  #[test]
  fn placeholder_can_be_disabled() {
    let controller = TodoController::init(
      MemoryStore::with_item(
        STORAGE_KEY,
        "[]"
      ),
      TodoOptions {
        show_empty_state: false,
        ..TodoOptions::default()
      }
    )
    .expect("init");

    assert!(controller.is_empty());
    assert!(!controller.placeholder_visible());
  }

  #[test]
  fn enter_finishes_only_while_editing() {
    let mut controller =
      controller_with(&["a"]);
    let a = controller.id_at(0).expect("a");

    assert_eq!(
      controller.edit_key(a, CONFIRM_KEY),
      EditKeyAction::Continue
    );

    assert!(controller.begin_edit(a));
    assert!(controller.is_editing(a));
    assert_eq!(
      controller.edit_key(a, "x"),
      EditKeyAction::Continue
    );
    assert_eq!(
      controller.edit_key(a, CONFIRM_KEY),
      EditKeyAction::Finish
    );
  }

  #[test]
  fn finish_edit_replaces_text_untrimmed() {
    let mut controller =
      controller_with(&["a", "b"]);
    let b = controller.id_at(1).expect("b");
    controller.begin_edit(b);

    let outcome = controller
      .finish_edit(b, "  b edited ")
      .expect("finish");

    assert_eq!(outcome, EditOutcome::Saved);
    assert!(!controller.is_editing(b));
    assert_eq!(
      controller.tasks(),
      ["a", "  b edited "]
    );
    assert_eq!(
      stored(&controller),
      controller.tasks()
    );
  }

  #[test]
  fn unchanged_edit_skips_the_write() {
    let mut controller =
      controller_with(&["a"]);
    let a = controller.id_at(0).expect("a");
    controller.begin_edit(a);

    let outcome = controller
      .finish_edit(a, "a")
      .expect("finish");

    assert_eq!(
      outcome,
      EditOutcome::Unchanged
    );
    assert_eq!(
      controller
        .store()
        .backend()
        .write_count(),
      0
    );
  }

  #[test]
  fn always_policy_writes_every_edit() {
    let mut controller = TodoController::init(
      MemoryStore::with_item(
        STORAGE_KEY,
        r#"["a"]"#
      ),
      TodoOptions {
        edit_commit: EditCommitPolicy::Always,
        ..TodoOptions::default()
      }
    )
    .expect("init");
    let a = controller.id_at(0).expect("a");
    controller.begin_edit(a);

    assert_eq!(
      controller
        .finish_edit(a, "a")
        .expect("finish"),
      EditOutcome::Saved
    );
    assert_eq!(
      controller
        .store()
        .backend()
        .write_count(),
      1
    );
  }

  #[test]
  fn edit_to_empty_does_not_touch_placeholder()
  {
    let mut controller =
      controller_with(&["a"]);
    let a = controller.id_at(0).expect("a");
    controller.begin_edit(a);

    controller
      .finish_edit(a, "")
      .expect("finish");

    assert_eq!(controller.tasks(), [""]);
    assert!(!controller.placeholder_visible());
  }

  #[test]
  fn stored_list_tracks_every_mutation() {
    let mut controller =
      controller_with(&["A", "B"]);

    controller.submit("C").expect("submit");
    let b = controller.id_at(2).expect("B");
    controller.duplicate(b).expect("duplicate");
    let a = controller.id_at(2).expect("A");
    controller.delete(a).expect("delete");
    let c = controller.id_at(1).expect("C");
    controller.begin_edit(c);
    controller
      .finish_edit(c, "C2")
      .expect("finish");

    assert_eq!(
      controller.tasks(),
      ["B", "C2", "B"]
    );
    assert_eq!(
      stored(&controller),
      controller.tasks()
    );
  }

  #[test]
  fn failed_saves_put_the_list_back() {
    let mut controller =
      read_only(r#"["a"]"#);
    let a = controller.id_at(0).expect("a");

    assert!(controller.submit("b").is_err());
    assert_eq!(controller.tasks(), ["a"]);

    assert!(controller.duplicate(a).is_err());
    assert_eq!(controller.tasks(), ["a"]);

    assert!(controller.delete(a).is_err());
    assert_eq!(controller.tasks(), ["a"]);
    assert!(!controller.placeholder_visible());
    assert_eq!(
      controller.store().load().expect("load"),
      controller.tasks()
    );
  }

  #[test]
  fn failed_edit_save_restores_text() {
    let mut controller =
      read_only(r#"["a","b"]"#);
    let b = controller.id_at(1).expect("b");
    controller.begin_edit(b);

    let err = controller
      .finish_edit(b, "b, edited")
      .expect_err("save fails");

    assert!(
      format!("{err:#}")
        .contains("storage is full")
    );
    assert!(!controller.is_editing(b));
    assert_eq!(controller.tasks(), ["a", "b"]);
  }
}
