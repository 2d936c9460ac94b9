//! Reusable HTML components
//!
//! Maud component functions for the generated release notes document.

pub mod layout;
