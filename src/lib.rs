//! pdf-bookmark: export and import PDF outlines as plain indented text.
//!
//! Layers, innermost first: `domain` (outline codecs, destination
//! resolution), `application` (services), `infrastructure` (lopdf and
//! filesystem access, service wiring) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;

pub mod util {
    pub mod path;
    pub mod testing;
}
