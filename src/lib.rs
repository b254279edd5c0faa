// src/lib.rs
pub mod features;
pub mod form;
pub mod inference;
pub mod model;
pub mod utils;
