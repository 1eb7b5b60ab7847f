// src/os/mod.rs

pub mod signal;
