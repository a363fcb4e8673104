pub mod employee;
pub mod role;
