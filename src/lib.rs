//! tvtube: a lean-back YouTube client for the terminal.
//!
//! The result grid and the suggestion row are both [`paging::PagedList`]s fed
//! one fetched [`paging::Group`] at a time.

pub mod app;
pub mod config;
pub mod constants;
pub mod countdown;
pub mod input;
pub mod paging;
pub mod player;
pub mod quirks;
pub mod settings;
pub mod suggest;
pub mod tags;
pub mod theme;
pub mod ticker;
pub mod ui;
pub mod youtube;
