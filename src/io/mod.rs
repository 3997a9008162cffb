pub mod gateway;
pub mod library;
pub mod lock;
pub mod settings;
