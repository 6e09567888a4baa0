//! Output rendering for the web interface.
//!
//! # Submodules
//!
//! - [`html`]: the article list as a styled HTML page
//!
//! The JSON surface needs no renderer of its own: records serialize directly
//! (see [`crate::server`]).

pub mod html;
