use todo_shared::{
  ItemId,
  TaskItem
};
use web_sys::KeyboardEvent;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::TodoItem;

#[derive(Properties, PartialEq)]
pub struct TodoListProps {
  pub items:        Vec<TaskItem>,
  pub editing:      Option<ItemId>,
  pub on_delete:    Callback<ItemId>,
  pub on_duplicate: Callback<ItemId>,
  pub on_edit:      Callback<ItemId>,
  pub on_edit_key:
    Callback<(ItemId, KeyboardEvent)>,
  pub on_edit_end:
    Callback<(ItemId, String)>
}

#[function_component(TodoList)]
pub fn todo_list(
  props: &TodoListProps
) -> Html {
  html! {
      <ul class="to-do__list">
          {
              for props.items.iter().cloned().map(|item| {
                  let key = item.id.to_string();
                  let editing = props.editing == Some(item.id);
                  html! {
                      <TodoItem
                          key={key}
                          item={item}
                          editing={editing}
                          on_delete={props.on_delete.clone()}
                          on_duplicate={props.on_duplicate.clone()}
                          on_edit={props.on_edit.clone()}
                          on_edit_key={props.on_edit_key.clone()}
                          on_edit_end={props.on_edit_end.clone()}
                      />
                  }
              })
          }
      </ul>
  }
}
