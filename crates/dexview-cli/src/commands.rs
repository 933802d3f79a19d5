//! Command handlers grouped by concern.

pub(crate) mod catalog;
pub(crate) mod favorites;
pub(crate) mod notes;
pub(crate) mod state;
pub(crate) mod theme;
pub(crate) mod view;
