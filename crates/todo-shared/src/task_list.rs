use serde::{
  Deserialize,
  Serialize
};
use uuid::Uuid;

/// Runtime identity of a rendered task.
/// Never persisted.
pub type ItemId = Uuid;

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskItem {
  pub id:   ItemId,
  pub text: String
}

impl TaskItem {
  pub fn new(text: String) -> Self {
    Self {
      id: Uuid::new_v4(),
      text
    }
  }
}

/// Ordered task texts, top of the list
/// first. Order is the only relationship
/// between items and duplicates are fine.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct TaskList {
  items: Vec<TaskItem>
}

impl TaskList {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds the list keeping the given
  /// order top to bottom.
  pub fn from_texts<I, T>(
    texts: I
  ) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>
  {
    let mut list = Self::new();
    for text in texts {
      list.append(text.into());
    }
    list
  }

  pub fn append(
    &mut self,
    text: String
  ) -> ItemId {
    let item = TaskItem::new(text);
    let id = item.id;
    self.items.push(item);
    id
  }

  pub fn prepend(
    &mut self,
    text: String
  ) -> ItemId {
    let item = TaskItem::new(text);
    let id = item.id;
    self.items.insert(0, item);
    id
  }

  pub fn remove(
    &mut self,
    id: ItemId
  ) -> Option<TaskItem> {
    let idx = self.position(id)?;
    Some(self.items.remove(idx))
  }

  /// Copies the item's text to the front
  /// of the list, not next to the original.
  pub fn duplicate(
    &mut self,
    id: ItemId
  ) -> Option<ItemId> {
    let text = self.get(id)?.text.clone();
    Some(self.prepend(text))
  }

  /// Replaces the text in place. Returns
  /// the previous text.
  pub fn set_text(
    &mut self,
    id: ItemId,
    text: String
  ) -> Option<String> {
    let item = self
      .items
      .iter_mut()
      .find(|item| item.id == id)?;
    Some(std::mem::replace(
      &mut item.text,
      text
    ))
  }

  pub fn get(
    &self,
    id: ItemId
  ) -> Option<&TaskItem> {
    self
      .items
      .iter()
      .find(|item| item.id == id)
  }

  pub fn position(
    &self,
    id: ItemId
  ) -> Option<usize> {
    self
      .items
      .iter()
      .position(|item| item.id == id)
  }

  pub fn id_at(
    &self,
    index: usize
  ) -> Option<ItemId> {
    self.items.get(index).map(|item| item.id)
  }

  pub fn items(&self) -> &[TaskItem] {
    &self.items
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = &TaskItem> {
    self.items.iter()
  }

  /// The persisted form of the list.
  pub fn texts(&self) -> Vec<String> {
    self
      .items
      .iter()
      .map(|item| item.text.clone())
      .collect()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}
