//! Terminal UI layer.
//!
//! The UI module owns rendering, layout, keyboard handling, and loop control
//! for the text user interface.
//!
//! Key submodules include:
//! - [`chat_loop`]: the main interaction loop that turns terminal input and
//!   stream output into [`crate::core::app::AppAction`]s.
//! - [`renderer`] and [`layout`]: frame composition.
//! - [`sidebar`], [`dashboard`], [`create_view`], and [`chat_view`]: one
//!   module per screen region.
//! - [`theme`] and [`markdown`]: style policy and reply formatting.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns domain logic and backend coordination.

pub mod chat_loop;
pub mod chat_view;
pub mod create_view;
pub mod dashboard;
pub mod layout;
pub mod markdown;
pub mod renderer;
pub mod sidebar;
pub mod theme;
