pub mod demo;
pub mod init;
pub mod query;
pub mod sdl;
