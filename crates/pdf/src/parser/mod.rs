pub mod backend;
pub mod layout;
pub mod spans;
