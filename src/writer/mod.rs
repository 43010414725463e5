//! Output stage: everything that lands on disk goes through here.
pub mod index;
pub mod scene;
