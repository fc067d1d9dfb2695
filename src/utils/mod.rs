// Utilidades compartidas

pub mod constants;

pub use constants::*;
