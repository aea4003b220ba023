pub mod cli;
pub mod key_capture;
