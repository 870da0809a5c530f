pub mod analysis;
pub mod budget;
pub mod dashboard;
pub mod login;
pub mod settings;
pub mod stats;
