pub mod employee;
pub mod payroll;

#[cfg(test)]
mod tests;
