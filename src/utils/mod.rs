pub mod artifact;
pub mod command;
pub mod shell;
