pub mod bridge;
pub mod input_stream;
pub mod manual_provider;
