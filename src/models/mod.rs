pub mod forms;
pub mod kinds;
