pub mod content;
pub mod extract;
