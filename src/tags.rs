use crate::paging::{Group, ListChange, ListObserver, PagedList};
use crate::youtube::VideoSummary;

/// A search suggestion shown in the tag row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
  pub text: String,
}

impl Tag {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into() }
  }
}

/// Anything that can sit in a display list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
  Video(VideoSummary),
  Tag(Tag),
}

impl Item {
  pub fn title(&self) -> &str {
    match self {
      Item::Video(v) => &v.title,
      Item::Tag(t) => &t.text,
    }
  }
}

/// Display list that can only ever hold tags.
#[derive(Default)]
pub struct TagList {
  inner: PagedList<Tag>,
}

impl TagList {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append the tags among `items` as one group. Other variants are dropped.
  pub fn add_all(&mut self, items: impl IntoIterator<Item = Item>) -> Option<ListChange> {
    let tags: Vec<Tag> = items
      .into_iter()
      .filter_map(|item| match item {
        Item::Tag(tag) => Some(tag),
        Item::Video(_) => None,
      })
      .collect();
    self.inner.append(Some(Group::new(tags)))
  }

  pub fn tags(&self) -> &[Tag] {
    self.inner.as_slice()
  }

  pub fn len(&self) -> usize {
    self.inner.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }

  pub fn get(&self, position: usize) -> &Tag {
    self.inner.get(position)
  }

  pub fn index_of(&self, tag: &Tag) -> Option<usize> {
    self.inner.index_of(tag)
  }

  pub fn clear(&mut self) -> Option<ListChange> {
    self.inner.clear()
  }

  pub fn subscribe(&mut self, observer: Box<dyn ListObserver>) {
    self.inner.subscribe(observer);
  }
}
