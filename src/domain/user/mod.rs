// User aggregate: the managed account record and its admin form

#![allow(clippy::module_inception)]

pub mod form;
pub mod user;

pub use form::UserForm;
pub use user::{NewUser, User};
