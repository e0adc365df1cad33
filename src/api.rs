pub mod client;
pub mod models;
pub mod portal;
pub mod provident;
pub mod session;
