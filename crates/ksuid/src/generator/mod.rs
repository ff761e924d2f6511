mod basic;

pub use basic::*;
