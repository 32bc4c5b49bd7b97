//! Viewport, scrolling and selection coordination for laid-out text.
//!
//! A [`RootSite`] sits between a host window and a [`LayoutBox`]: it lays the
//! box out to the client width, keeps the scroll ranges in step with content
//! whose lazy regions grow as they are drawn, maps paint coordinates to layout
//! coordinates for both horizontal and vertical text, and scrolls the
//! selection into view. A [`SplitView`] shows one box through two panes that
//! scroll independently but share range changes and the active selection.

pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod layout_box;
pub mod orientation;
pub mod print;
pub mod registry;
pub mod root_site;
pub mod scroll;
pub mod selection;
pub mod split;

pub use config::ViewConfig;
pub use context::{CancelFlag, ErrorReporter, RenderingContext};
pub use error::{ViewError, ViewResult};
pub use host::{HeadlessHost, HostWindow, SharedHost};
pub use layout_box::{LayoutBox, LazyExpansion, PrepareOutcome, PrepareStatus, SharedLayoutBox};
pub use orientation::{Orientation, ViewKind};
pub use print::{print_pages, PageSetup, PageSink, PrintOutcome};
pub use registry::{ActiveSelectionRegistry, PaneId};
pub use root_site::{DrawOutcome, FocusState, LayoutOutcome, RootSite, ScrollMode};
pub use scroll::{Axis, ScrollInfo};
pub use selection::{Selection, SelectionLocation, SelectionState, TextPos, TextPropChanges};
pub use split::SplitView;
