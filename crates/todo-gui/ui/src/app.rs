mod state;
mod storage;

use todo_shared::{
  EditKeyAction,
  ItemId
};
use web_sys::{
  HtmlElement,
  HtmlInputElement,
  InputEvent,
  KeyboardEvent,
  SubmitEvent
};
use yew::{
  Callback,
  Html,
  TargetCast,
  function_component,
  html,
  use_reducer
};

use crate::components::{
  EmptyState,
  TodoForm,
  TodoList
};
use state::{
  AppState,
  TodoAction
};

#[function_component(App)]
pub fn app() -> Html {
  let state = use_reducer(AppState::load);

  let on_input = {
    let state = state.clone();
    Callback::from(move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      state.dispatch(
        TodoAction::SetDraft(input.value())
      );
    })
  };

  let on_submit = {
    let state = state.clone();
    Callback::from(move |e: SubmitEvent| {
      e.prevent_default();
      state.dispatch(TodoAction::Submit);
    })
  };

  let on_delete = {
    let state = state.clone();
    Callback::from(move |id: ItemId| {
      state.dispatch(TodoAction::Delete(id));
    })
  };

  let on_duplicate = {
    let state = state.clone();
    Callback::from(move |id: ItemId| {
      state.dispatch(
        TodoAction::Duplicate(id)
      );
    })
  };

  let on_edit = {
    let state = state.clone();
    Callback::from(move |id: ItemId| {
      state.dispatch(
        TodoAction::BeginEdit(id)
      );
    })
  };

  let on_edit_key = {
    let state = state.clone();
    Callback::from(
      move |(id, e): (
        ItemId,
        KeyboardEvent
      )| {
        let action = state
          .controller
          .as_ref()
          .map(|controller| {
            controller.edit_key(id, &e.key())
          })
          .unwrap_or(
            EditKeyAction::Continue
          );

        if action == EditKeyAction::Finish
        {
          e.prevent_default();
          let text: HtmlElement =
            e.target_unchecked_into();
          if let Err(error) = text.blur() {
            tracing::debug!(
              ?error,
              "failed to leave edit mode"
            );
          }
        }
      }
    )
  };

  let on_edit_end = {
    let state = state.clone();
    Callback::from(
      move |(id, text): (ItemId, String)| {
        state.dispatch(
          TodoAction::FinishEdit {
            id,
            text
          }
        );
      }
    )
  };

  let error_banner = match &state.error {
    | Some(message) => {
      html! {
          <div class="to-do__error" role="alert">{ message.clone() }</div>
      }
    }
    | None => html! {}
  };

  let list = match &state.controller {
    | Some(controller) => {
      html! {
          <>
              <TodoList
                  items={controller.items().to_vec()}
                  editing={controller.editing()}
                  on_delete={on_delete}
                  on_duplicate={on_duplicate}
                  on_edit={on_edit}
                  on_edit_key={on_edit_key}
                  on_edit_end={on_edit_end}
              />
              <EmptyState
                  visible={controller.placeholder_visible()}
                  message={controller.empty_message().to_string()}
              />
          </>
      }
    }
    | None => html! {}
  };

  html! {
      <main class="to-do">
          <h1 class="to-do__title">{ "To-do list" }</h1>
          { error_banner }
          <TodoForm
              draft={state.draft.clone()}
              on_input={on_input}
              on_submit={on_submit}
          />
          { list }
      </main>
  }
}
