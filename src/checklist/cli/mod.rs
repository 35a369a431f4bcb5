//! Terminal output for the binary. Nothing in here is part of the library
//! API.

pub mod print;
