//! The searchable, lazily paginated multi-select list.
//!
//! Three parts do the work, each usable on its own:
//!
//! | Type | Owns |
//! |------|------|
//! | [`PageStore`](page_store::PageStore) | Loaded options (deduplicated by id), the next-page cursor, the in-flight flag |
//! | [`SelectionController`](selection::SelectionController) | The ordered set of selected ids |
//! | [`ListPresenter`](presenter::ListPresenter) | Search term, open panel, end-of-list detection, chips, highlighting; implements [`lazypick_core::Component`] |
//!
//! # Supporting modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`option`] | Options, pages, and the provider's JSON format |
//! | [`source`] | [`PageSource`](source::PageSource) seam and the reqwest-backed [`HttpSource`](source::HttpSource) |
//! | [`config`] | [`PickerConfig`](config::PickerConfig) |
//! | [`highlight`] | Case-insensitive matching and match fragments |
//! | [`visibility`] | Edge-triggered end-of-list watch |
//! | [`scroll`] | Row cursor and viewport offset |
//! | [`key`] | Key bindings and the hint line |
//! | [`spinner`] | Loading indicator |

pub mod config;
pub mod highlight;
pub mod key;
pub mod option;
pub mod page_store;
pub mod presenter;
pub mod scroll;
pub mod selection;
pub mod source;
pub mod spinner;
pub mod visibility;

#[cfg(test)]
mod testing;

pub use config::PickerConfig;
pub use option::{OptionId, Page, SelectOption};
pub use page_store::PageStore;
pub use presenter::ListPresenter;
pub use selection::SelectionController;
pub use source::{FetchError, HttpSource, PageSource};
