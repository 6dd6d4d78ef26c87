pub mod decode;
pub mod resolve;
