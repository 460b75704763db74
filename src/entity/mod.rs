pub mod audit_logs;
pub mod categories;
pub mod enums;
pub mod order_items;
pub mod orders;
pub mod product_suppliers;
pub mod products;
pub mod supplier_prices;
pub mod supplier_reviews;
pub mod suppliers;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_suppliers::Entity as ProductSuppliers;
pub use products::Entity as Products;
pub use supplier_prices::Entity as SupplierPrices;
pub use supplier_reviews::Entity as SupplierReviews;
pub use suppliers::Entity as Suppliers;
pub use users::Entity as Users;
