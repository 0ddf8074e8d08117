pub mod migration;
pub mod registery;
