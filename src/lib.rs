pub mod cli;
pub mod config;
pub mod ctx;
pub mod dataset;
pub mod error;
pub mod expr;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod sample;
