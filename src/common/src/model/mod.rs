pub mod choice;
pub mod frame;
pub mod transaction;
