#![allow(dead_code)]

pub mod collecting_handler;
pub mod shared_buffer;

pub use collecting_handler::CollectingHandler;
pub use shared_buffer::SharedBuf;
