pub mod shortcuts;
