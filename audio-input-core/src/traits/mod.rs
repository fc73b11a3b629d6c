pub mod input_provider;
pub mod stream_delegate;
