pub mod categories;
pub mod links;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod reports;
pub mod suppliers;
pub mod users;
