pub mod cache;
pub mod extensions;
pub mod render;
