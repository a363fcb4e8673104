pub mod batch;
pub mod clock;
pub mod dispatcher;
pub mod renderer;
pub mod schedule;
pub mod store;

pub use batch::{BatchReport, PayrollBatch};
