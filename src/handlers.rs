pub mod auth;
pub mod catalog;
pub mod customers;
pub mod dashboard;
pub mod sales;
