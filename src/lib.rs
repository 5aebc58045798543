#[allow(non_snake_case)]
pub mod Redox;
pub mod cli;
pub mod settings;
