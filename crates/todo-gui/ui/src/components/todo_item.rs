use todo_shared::{
  ItemId,
  TaskItem
};
use web_sys::{
  FocusEvent,
  HtmlElement,
  KeyboardEvent
};
use yew::{
  Callback,
  Html,
  NodeRef,
  Properties,
  function_component,
  html,
  use_effect_with,
  use_node_ref
};

#[derive(Properties, PartialEq)]
pub struct TodoItemProps {
  pub item:         TaskItem,
  pub editing:      bool,
  pub on_delete:    Callback<ItemId>,
  pub on_duplicate: Callback<ItemId>,
  pub on_edit:      Callback<ItemId>,
  pub on_edit_key:
    Callback<(ItemId, KeyboardEvent)>,
  pub on_edit_end:
    Callback<(ItemId, String)>
}

#[function_component(TodoItem)]
pub fn todo_item(
  props: &TodoItemProps
) -> Html {
  let id = props.item.id;
  let text_ref = use_node_ref();

  {
    let text_ref = text_ref.clone();
    use_effect_with(
      (
        props.editing,
        props.item.text.clone()
      ),
      move |(editing, text)| {
        if *editing {
          focus(&text_ref);
        } else {
          show_text(&text_ref, text);
        }
      }
    );
  }

  let on_delete = {
    let on_delete =
      props.on_delete.clone();
    Callback::from(
      move |_: yew::MouseEvent| {
        on_delete.emit(id)
      }
    )
  };

  let on_duplicate = {
    let on_duplicate =
      props.on_duplicate.clone();
    Callback::from(
      move |_: yew::MouseEvent| {
        on_duplicate.emit(id)
      }
    )
  };

  let on_edit = {
    let on_edit = props.on_edit.clone();
    Callback::from(
      move |_: yew::MouseEvent| {
        on_edit.emit(id)
      }
    )
  };

  let on_keydown = {
    let on_edit_key =
      props.on_edit_key.clone();
    Callback::from(
      move |e: KeyboardEvent| {
        on_edit_key.emit((id, e))
      }
    )
  };

  let on_blur = {
    let on_edit_end =
      props.on_edit_end.clone();
    let text_ref = text_ref.clone();
    Callback::from(move |_: FocusEvent| {
      let text = text_ref
        .cast::<HtmlElement>()
        .and_then(|el| el.text_content())
        .unwrap_or_default();
      on_edit_end.emit((id, text));
    })
  };

  // Keyed by text so a committed edit
  // replaces the node the browser edited.
  html! {
      <li class="to-do__item">
          <span
              key={props.item.text.clone()}
              ref={text_ref}
              class="to-do__item-text"
              contenteditable={if props.editing { "true" } else { "false" }}
              onkeydown={on_keydown}
              onblur={on_blur}
          >
              { props.item.text.clone() }
          </span>
          <button
              type="button"
              class="to-do__item-button to-do__item-button_type_delete"
              aria-label="Delete"
              onclick={on_delete}
          ></button>
          <button
              type="button"
              class="to-do__item-button to-do__item-button_type_duplicate"
              aria-label="Duplicate"
              onclick={on_duplicate}
          ></button>
          <button
              type="button"
              class="to-do__item-button to-do__item-button_type_edit"
              aria-label="Edit"
              onclick={on_edit}
          ></button>
      </li>
  }
}

fn focus(text_ref: &NodeRef) {
  if let Some(el) =
    text_ref.cast::<HtmlElement>()
  {
    if let Err(error) = el.focus() {
      tracing::debug!(
        ?error,
        "failed to focus task text"
      );
    }
  }
}

// An edit that was not kept leaves the
// browser's typing in the node; put the
// list's text back.
fn show_text(
  text_ref: &NodeRef,
  text: &str
) {
  let Some(el) =
    text_ref.cast::<HtmlElement>()
  else {
    return;
  };
  if el.text_content().as_deref()
    != Some(text)
  {
    el.set_text_content(Some(text));
  }
}
