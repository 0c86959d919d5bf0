pub mod records;
pub mod views;

pub use records::*;
pub use views::*;
