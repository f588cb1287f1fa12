//! Commands bundled with the framework.

mod generate;

pub use generate::GenerateCommand;
