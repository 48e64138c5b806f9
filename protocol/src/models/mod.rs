pub mod agenda;
pub mod clinico;
pub mod config;
pub mod paciente;

pub use agenda::*;
pub use clinico::*;
pub use config::*;
pub use paciente::*;
