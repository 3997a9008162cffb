pub mod launch;
pub mod order;
