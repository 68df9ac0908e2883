pub mod auth;
pub mod catalog;
pub mod customer;
pub mod dashboard;
pub mod sale;
