//! Sea-ORM entities of the catalog schema.
//!
//! `product` is the aggregate; the others are reference tables owned by
//! other services and only read here.

pub mod brand;
pub mod category;
pub mod product;
pub mod store;
pub mod sub_category;
pub mod unit;
pub mod user;
pub mod warehouse;
