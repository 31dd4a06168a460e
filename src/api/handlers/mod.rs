pub mod account;
pub mod home;
pub mod products;
pub mod users;
