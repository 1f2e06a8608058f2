use web_sys::{
  InputEvent,
  SubmitEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TodoFormProps {
  pub draft:     String,
  pub on_input:  Callback<InputEvent>,
  pub on_submit: Callback<SubmitEvent>
}

#[function_component(TodoForm)]
pub fn todo_form(
  props: &TodoFormProps
) -> Html {
  html! {
      <form class="to-do__form" onsubmit={props.on_submit.clone()}>
          <input
              class="to-do__input"
              type="text"
              placeholder="Next task"
              value={props.draft.clone()}
              oninput={props.on_input.clone()}
          />
          <button type="submit" class="button to-do__submit">{ "Add" }</button>
      </form>
  }
}
