pub mod async_decoder;

pub use async_decoder::AsyncDecoder;
