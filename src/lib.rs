// src/lib.rs

//! msgarchive Library
//!
//! Walks a paginated message listing through a UI [`driver::Driver`], expands
//! every conversation thread, and appends each newly seen conversation to an
//! append-only JSON-lines archive.

pub mod driver;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
