//! Paged display list backing the result grid and the tag row.
//!
//! Fetch completions hand over one [`Group`] at a time. The list flattens
//! groups into a single ordered sequence and reports the exact index range
//! that changed, so the renderer can keep its selection and scroll offset
//! instead of rebuilding everything on every page load.

use crate::youtube::Continuation;

/// One fetched batch of items plus batch-level metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<T> {
  pub title: Option<String>,
  pub items: Vec<T>,
  /// Where the next page of this listing starts, if there is one.
  pub continuation: Option<Continuation>,
}

impl<T> Group<T> {
  pub fn new(items: Vec<T>) -> Self {
    Self { title: None, items, continuation: None }
  }

  pub fn with_continuation(mut self, continuation: Option<Continuation>) -> Self {
    self.continuation = continuation;
    self
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = Some(title.into());
    self
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Batch metadata without the items.
  pub fn meta(&self) -> GroupMeta {
    GroupMeta { title: self.title.clone(), continuation: self.continuation.clone(), len: self.items.len() }
  }
}

/// What the list remembers about the last appended group once its items
/// have moved into the list.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMeta {
  pub title: Option<String>,
  pub continuation: Option<Continuation>,
  pub len: usize,
}

/// A change over the half-open range `[start, start + count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
  Inserted { start: usize, count: usize },
  Removed { start: usize, count: usize },
}

impl ListChange {
  pub fn range(&self) -> std::ops::Range<usize> {
    match *self {
      ListChange::Inserted { start, count } | ListChange::Removed { start, count } => start..start + count,
    }
  }
}

pub trait ListObserver {
  fn on_change(&mut self, change: &ListChange);
}

/// Observer that writes every change to the log.
pub struct TraceObserver {
  pub name: &'static str,
}

impl ListObserver for TraceObserver {
  fn on_change(&mut self, change: &ListChange) {
    tracing::debug!(list = self.name, ?change, "list changed");
  }
}

/// Ordered item sequence fed by [`Group`]s.
///
/// Appending never deduplicates: the same item appended twice shows up twice.
pub struct PagedList<T> {
  items: Vec<T>,
  last_group: Option<GroupMeta>,
  observers: Vec<Box<dyn ListObserver>>,
}

impl<T> Default for PagedList<T> {
  fn default() -> Self {
    Self { items: Vec::new(), last_group: None, observers: Vec::new() }
  }
}

impl<T> PagedList<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Item at `position`.
  ///
  /// # Panics
  ///
  /// Panics if `position >= self.len()`.
  pub fn get(&self, position: usize) -> &T {
    match self.items.get(position) {
      Some(item) => item,
      None => panic!("position {} out of range for list of length {}", position, self.items.len()),
    }
  }

  pub fn try_get(&self, position: usize) -> Option<&T> {
    self.items.get(position)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, T> {
    self.items.iter()
  }

  pub fn as_slice(&self) -> &[T] {
    &self.items
  }

  pub fn subscribe(&mut self, observer: Box<dyn ListObserver>) {
    self.observers.push(observer);
  }

  /// Append a group's items at the end and report the inserted range.
  ///
  /// `None` is accepted so fetch handlers can forward whatever they got.
  pub fn append(&mut self, group: Option<Group<T>>) -> Option<ListChange> {
    let Group { title, items, continuation } = group?;
    let begin = self.items.len();
    let count = items.len();
    self.items.extend(items);
    self.last_group = Some(GroupMeta { title, continuation, len: count });

    if count == 0 {
      return None;
    }
    let change = ListChange::Inserted { start: begin, count };
    self.notify(&change);
    Some(change)
  }

  /// Remove everything. Nothing is reported when the list is already empty.
  pub fn clear(&mut self) -> Option<ListChange> {
    self.last_group = None;
    if self.items.is_empty() {
      return None;
    }
    let count = self.items.len();
    self.items.clear();
    let change = ListChange::Removed { start: 0, count };
    self.notify(&change);
    Some(change)
  }

  /// The most recently appended group.
  pub fn group(&self) -> Option<&GroupMeta> {
    self.last_group.as_ref()
  }

  fn notify(&mut self, change: &ListChange) {
    for observer in &mut self.observers {
      observer.on_change(change);
    }
  }
}

impl<T: PartialEq> PagedList<T> {
  pub fn index_of(&self, item: &T) -> Option<usize> {
    self.items.iter().position(|i| i == item)
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use std::cell::RefCell;
  use std::rc::Rc;

  /// Collects every change it sees into a shared vec.
  #[derive(Clone, Default)]
  pub(crate) struct Recorder(pub(crate) Rc<RefCell<Vec<ListChange>>>);

  impl ListObserver for Recorder {
    fn on_change(&mut self, change: &ListChange) {
      self.0.borrow_mut().push(*change);
    }
  }

  impl Recorder {
    pub(crate) fn changes(&self) -> Vec<ListChange> {
      self.0.borrow().clone()
    }
  }

  fn list_with_recorder() -> (PagedList<&'static str>, Recorder) {
    let recorder = Recorder::default();
    let mut list = PagedList::new();
    list.subscribe(Box::new(recorder.clone()));
    (list, recorder)
  }

  #[test]
  fn append_reports_exact_ranges() {
    let (mut list, rec) = list_with_recorder();
    list.append(Some(Group::new(vec!["a", "b", "c"])));
    list.append(Some(Group::new(vec!["d"])));
    list.append(Some(Group::new(vec!["e", "f"])));

    assert_eq!(list.len(), 6);
    assert_eq!(
      rec.changes(),
      vec![
        ListChange::Inserted { start: 0, count: 3 },
        ListChange::Inserted { start: 3, count: 1 },
        ListChange::Inserted { start: 4, count: 2 },
      ]
    );
  }

  #[test]
  fn append_keeps_group_order() {
    let (mut list, _) = list_with_recorder();
    list.append(Some(Group::new(vec!["x", "y"])));
    list.append(Some(Group::new(vec!["z"])));
    assert_eq!(list.as_slice(), &["x", "y", "z"]);
  }

  #[test]
  fn append_none_is_a_noop() {
    let (mut list, rec) = list_with_recorder();
    let g = Group::new(vec!["a"]);
    list.append(Some(g.clone()));

    assert_eq!(list.append(None), None);
    assert_eq!(list.len(), 1);
    assert_eq!(list.group(), Some(&g.meta()));
    assert_eq!(rec.changes().len(), 1);
  }

  #[test]
  fn append_empty_group_records_it_without_notifying() {
    let (mut list, rec) = list_with_recorder();
    let empty = Group::new(vec![]).with_title("nothing here");
    assert_eq!(list.append(Some(empty.clone())), None);
    assert_eq!(list.group(), Some(&empty.meta()));
    assert!(rec.changes().is_empty());
  }

  #[test]
  fn clear_on_empty_is_silent() {
    let (mut list, rec) = list_with_recorder();
    assert_eq!(list.group(), None);
    assert_eq!(list.clear(), None);
    assert_eq!(list.len(), 0);
    assert!(rec.changes().is_empty());
  }

  #[test]
  fn clear_reports_whole_range() {
    let (mut list, rec) = list_with_recorder();
    list.append(Some(Group::new(vec!["a", "b"])));
    assert_eq!(list.clear(), Some(ListChange::Removed { start: 0, count: 2 }));
    assert!(list.is_empty());
    assert_eq!(rec.changes().last(), Some(&ListChange::Removed { start: 0, count: 2 }));
  }

  #[test]
  fn clear_then_append_matches_fresh_list() {
    let g = Group::new(vec!["n1", "n2"]);

    let mut reused: PagedList<&str> = PagedList::new();
    reused.append(Some(Group::new(vec!["old"])));
    reused.clear();
    let reused_change = reused.append(Some(g.clone()));

    let mut fresh: PagedList<&str> = PagedList::new();
    let fresh_change = fresh.append(Some(g.clone()));

    assert_eq!(reused_change, fresh_change);
    assert_eq!(reused.as_slice(), fresh.as_slice());
    assert_eq!(reused.group(), fresh.group());
  }

  #[test]
  fn index_of_finds_first_occurrence() {
    let mut list = PagedList::new();
    list.append(Some(Group::new(vec!["a", "b", "a"])));
    assert_eq!(list.index_of(&"a"), Some(0));
    assert_eq!(list.index_of(&"b"), Some(1));
    assert_eq!(list.index_of(&"missing"), None);
  }

  #[test]
  fn duplicates_are_kept() {
    let mut list = PagedList::new();
    let g = Group::new(vec!["v1"]);
    list.append(Some(g.clone()));
    list.append(Some(g));
    assert_eq!(list.len(), 2);
    assert_eq!(list.index_of(&"v1"), Some(0));
  }

  #[test]
  fn last_group_keeps_metadata_only() {
    #[derive(Debug, PartialEq)]
    struct Unclonable(u8);

    let mut list = PagedList::new();
    let next = Continuation { source: "ytsearch200:q".into(), start: 3 };
    let g = Group::new(vec![Unclonable(1), Unclonable(2)]).with_title("page").with_continuation(Some(next.clone()));
    list.append(Some(g));

    let meta = list.group().cloned();
    assert_eq!(meta, Some(GroupMeta { title: Some("page".into()), continuation: Some(next), len: 2 }));
    assert_eq!(list.index_of(&Unclonable(2)), Some(1));
  }

  #[test]
  #[should_panic(expected = "out of range")]
  fn get_out_of_range_panics() {
    let mut list = PagedList::new();
    list.append(Some(Group::new(vec![1, 2])));
    let _ = list.get(2);
  }

  #[test]
  fn try_get_is_bounded() {
    let mut list = PagedList::new();
    list.append(Some(Group::new(vec![1])));
    assert_eq!(list.try_get(0), Some(&1));
    assert_eq!(list.try_get(1), None);
  }

  #[test]
  fn append_append_clear_scenario() {
    let (mut list, rec) = list_with_recorder();
    let a = Group::new(vec!["v1", "v2"]);
    let b = Group::new(vec!["v3"]);

    list.append(Some(a.clone()));
    assert_eq!(list.len(), 2);
    assert_eq!(list.group(), Some(&a.meta()));

    let change = list.append(Some(b.clone()));
    assert_eq!(list.len(), 3);
    assert_eq!(change.map(|c| c.range()), Some(2..3));
    assert_eq!(list.group(), Some(&b.meta()));

    let change = list.clear();
    assert_eq!(list.len(), 0);
    assert_eq!(change.map(|c| c.range()), Some(0..3));
    assert_eq!(rec.changes().len(), 3);
  }
}
