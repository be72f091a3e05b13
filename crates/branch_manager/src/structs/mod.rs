pub mod branch;
pub mod chat;
pub mod comparison;
pub mod message;
