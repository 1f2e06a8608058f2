use std::rc::Rc;

use todo_shared::{
  ItemId,
  KeyValueStore,
  SubmitOutcome,
  TodoController,
  TodoOptions
};
use yew::Reducible;

use super::storage::LocalStorage;

pub type AppState = TodoState<LocalStorage>;

pub enum TodoAction {
  SetDraft(String),
  Submit,
  Delete(ItemId),
  Duplicate(ItemId),
  BeginEdit(ItemId),
  FinishEdit {
    id:   ItemId,
    text: String
  }
}

#[derive(Debug, Clone)]
pub struct TodoState<S> {
  /// `None` when the stored list could not
  /// be read at startup.
  pub controller: Option<TodoController<S>>,
  pub draft:      String,
  pub error:      Option<String>
}

impl AppState {
  pub fn load() -> Self {
    match LocalStorage::open() {
      | Ok(backend) => {
        Self::init(
          backend,
          TodoOptions::default()
        )
      }
      | Err(error) => Self::unavailable(error)
    }
  }
}

impl<S: KeyValueStore> TodoState<S> {
  pub fn init(
    backend: S,
    options: TodoOptions
  ) -> Self {
    match TodoController::init(
      backend, options
    ) {
      | Ok(controller) => {
        Self {
          controller: Some(controller),
          draft:      String::new(),
          error:      None
        }
      }
      | Err(error) => Self::unavailable(error)
    }
  }

  fn unavailable(
    error: anyhow::Error
  ) -> Self {
    let message = format!("{error:#}");
    tracing::error!(
      error = %message,
      "failed to load tasks"
    );
    Self {
      controller: None,
      draft:      String::new(),
      error:      Some(message)
    }
  }
}

impl<S: KeyValueStore + Clone> Reducible
  for TodoState<S>
{
  type Action = TodoAction;

  // Applied in dispatch order to the latest
  // state. The controller puts the list back
  // when a save fails.
  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut next = (*self).clone();
    let Some(controller) =
      next.controller.as_mut()
    else {
      return self;
    };

    let result = match action {
      | TodoAction::SetDraft(draft) => {
        next.draft = draft;
        Ok(())
      }
      | TodoAction::Submit => {
        match controller.submit(&next.draft)
        {
          | Ok(SubmitOutcome::Added(_)) => {
            next.draft.clear();
            Ok(())
          }
          | Ok(SubmitOutcome::Rejected) => {
            Ok(())
          }
          | Err(error) => Err(error)
        }
      }
      | TodoAction::Delete(id) => {
        controller.delete(id).map(|_| ())
      }
      | TodoAction::Duplicate(id) => {
        controller
          .duplicate(id)
          .map(|_| ())
      }
      | TodoAction::BeginEdit(id) => {
        controller.begin_edit(id);
        Ok(())
      }
      | TodoAction::FinishEdit {
        id,
        text
      } => {
        controller
          .finish_edit(id, &text)
          .map(|_| ())
      }
    };

    match result {
      | Ok(()) => {
        next.error = None;
      }
      | Err(error) => {
        let message = format!("{error:#}");
        tracing::error!(
          error = %message,
          "failed to save tasks"
        );
        next.error = Some(message);
      }
    }
    Rc::new(next)
  }
}

#[cfg(test)]
mod state_tests {
  use anyhow::anyhow;
  use todo_shared::{
    MemoryStore,
    STORAGE_KEY
  };

  use super::*;

  /// Reads like a normal store but rejects
  /// every write, like a full quota.
  #[derive(Debug, Clone)]
  struct FullStore(MemoryStore);

  impl KeyValueStore for FullStore {
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
      Err(anyhow!("quota exceeded"))
    }

    fn remove_item(
      &mut self,
      _key: &str
    ) -> anyhow::Result<()> {
      Err(anyhow!("quota exceeded"))
    }
  }

  fn seeded(tasks: &str) -> MemoryStore {
    MemoryStore::with_item(
      STORAGE_KEY,
      tasks
    )
  }

  fn start<S: KeyValueStore>(
    backend: S
  ) -> Rc<TodoState<S>> {
    let state = TodoState::init(
      backend,
      TodoOptions::default()
    );
    assert!(state.error.is_none());
    Rc::new(state)
  }

  fn tasks<S: KeyValueStore>(
    state: &TodoState<S>
  ) -> Vec<String> {
    state
      .controller
      .as_ref()
      .expect("controller")
      .tasks()
  }

  fn first_id<S: KeyValueStore>(
    state: &TodoState<S>
  ) -> ItemId {
    state
      .controller
      .as_ref()
      .and_then(|c| c.id_at(0))
      .expect("first task")
  }

  #[test]
  fn blank_submit_keeps_the_draft() {
    let state = start(seeded(r#"["a"]"#))
      .reduce(TodoAction::SetDraft(
        "   ".to_string()
      ))
      .reduce(TodoAction::Submit);

    assert_eq!(state.draft, "   ");
    assert_eq!(tasks(&state), ["a"]);
    assert!(state.error.is_none());
  }

  #[test]
  fn added_task_clears_the_draft() {
    let state = start(seeded(r#"["a"]"#))
      .reduce(TodoAction::SetDraft(
        " b ".to_string()
      ))
      .reduce(TodoAction::Submit);

    assert_eq!(state.draft, "");
    assert_eq!(tasks(&state), ["b", "a"]);
    let stored = state
      .controller
      .as_ref()
      .expect("controller")
      .store()
      .load()
      .expect("load");
    assert_eq!(stored, ["b", "a"]);
  }

  #[test]
  fn failed_submit_keeps_list_and_draft() {
    let state =
      start(FullStore(seeded(r#"["a"]"#)))
        .reduce(TodoAction::SetDraft(
          "b".to_string()
        ))
        .reduce(TodoAction::Submit);

    assert_eq!(state.draft, "b");
    assert_eq!(tasks(&state), ["a"]);
    let error =
      state.error.as_deref().expect("error");
    assert!(error.contains("quota exceeded"));
  }

  #[test]
  fn failed_delete_keeps_the_list() {
    let state =
      start(FullStore(seeded(r#"["a","b"]"#)));
    let a = first_id(&state);

    let state =
      state.reduce(TodoAction::Delete(a));

    assert_eq!(tasks(&state), ["a", "b"]);
    assert!(state.error.is_some());
  }

  #[test]
  fn failed_edit_leaves_edit_mode() {
    let state =
      start(FullStore(seeded(r#"["a"]"#)));
    let a = first_id(&state);

    let state = state
      .reduce(TodoAction::BeginEdit(a))
      .reduce(TodoAction::FinishEdit {
        id:   a,
        text: "a, edited".to_string()
      });

    let controller = state
      .controller
      .as_ref()
      .expect("controller");
    assert!(!controller.is_editing(a));
    assert_eq!(controller.tasks(), ["a"]);
    assert!(state.error.is_some());
  }

  #[test]
  fn next_success_clears_the_error() {
    let state =
      start(FullStore(seeded(r#"["a"]"#)))
        .reduce(TodoAction::SetDraft(
          "b".to_string()
        ))
        .reduce(TodoAction::Submit);
    assert!(state.error.is_some());

    let state = state.reduce(
      TodoAction::SetDraft("c".to_string())
    );
    assert!(state.error.is_none());
  }

  #[test]
  fn unreadable_store_has_no_controller() {
    let state = TodoState::init(
      seeded("{oops"),
      TodoOptions {
        corrupt_data: todo_shared::CorruptDataPolicy::Propagate,
        ..TodoOptions::default()
      }
    );
    assert!(state.controller.is_none());
    assert!(state.error.is_some());

    let state = Rc::new(state)
      .reduce(TodoAction::Submit);
    assert!(state.controller.is_none());
  }
}
