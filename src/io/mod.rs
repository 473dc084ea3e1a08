mod streams;

pub use streams::{open_sink, open_source, StreamError};
