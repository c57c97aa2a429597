pub mod authorization;
pub mod linking;
