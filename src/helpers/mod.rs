pub mod email;
pub mod harvest;
pub mod report;
