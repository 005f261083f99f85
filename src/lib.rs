// src/lib.rs
pub mod errors;
pub mod sema;
pub mod syntax;
