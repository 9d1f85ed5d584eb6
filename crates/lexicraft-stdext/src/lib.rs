//! # Lexicraft standard library extensions
//!
//! This crate contains data structures and algorithms used in the Lexicraft
//! project that are independent of the Lexlang language itself.

pub mod algorithms {
    pub mod spellcheck;
}

pub mod collections {
    pub mod interner;
    pub mod scoped;
}

pub mod color;
