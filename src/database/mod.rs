//! Catalog access layer.
//!
//! [`CatalogConnector`] opens one [`CatalogSession`] per engine call; the MySQL
//! implementation talks to `information_schema` through `sqlx`.

pub mod catalog;
pub mod connection_string;
pub mod grouping;
pub mod model;
pub mod mysql;
pub mod traits;

pub use catalog::{ColumnRow, ForeignKeyRow, IndexRow, ObjectCountRow, SchemaRow, TableRow, ViewRow};
pub use connection_string::ConnectionStringParser;
pub use model::*;
pub use mysql::{MySqlConnector, MySqlSession};
pub use traits::{CatalogConnector, CatalogSession};
