//! Client side of the data table: state, interactions and rendering.

pub mod client;
pub mod column;
pub mod debounce;
pub mod navigation;
pub mod render;
pub mod sort;
pub mod view;

pub use column::Column;
pub use navigation::{ChannelNavigator, History, Navigator, Visit, VisitOptions};
pub use render::{render_table, RenderedTable};
pub use sort::{next_sort, SortDescriptor};
pub use view::TableView;
