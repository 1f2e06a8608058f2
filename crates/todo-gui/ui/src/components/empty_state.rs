use yew::{
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct EmptyStateProps {
  pub visible: bool,
  pub message: String
}

/// Rendered directly after the list
/// container, once, while the list is empty.
#[function_component(EmptyState)]
pub fn empty_state(
  props: &EmptyStateProps
) -> Html {
  if !props.visible {
    return html! {};
  }

  html! {
      <p
          class="to-do__empty"
          style="text-align:center;color:#777;margin-top:40px;"
      >
          { props.message.clone() }
      </p>
  }
}
