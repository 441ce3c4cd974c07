pub mod catalog;
pub mod cli;
pub mod color;
pub mod inspire;
pub mod pipeline;
pub mod server;
pub mod uploads;
