pub mod attendance;
pub mod department;
pub mod employee;
pub mod filter;
pub mod roster;
pub mod status;
