pub mod consumption;
pub mod selector;
pub mod utility;
