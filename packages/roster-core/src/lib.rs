//! Core of the project roster board: projects holding ordered member
//! assignments, rearranged by drag and drop and committed with an explicit
//! save.

pub mod board;
pub mod drag;
pub mod identity;
pub mod members;
pub mod ordering;
pub mod reconcile;
pub mod session;
pub mod storage;
pub mod types;
pub mod validate;
