// src/db/mod.rs
pub mod models;
pub mod mongodb;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use models::{Booking, Branch, Restaurant, Table, User};
pub use mongodb::MongoRepo;
pub use store::ReservationStore;

use chrono::{DateTime, Utc};

/// Timestamp unix actual en segundos.
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Convierte un timestamp unix almacenado a `DateTime<Utc>` para la API.
pub fn datetime_from_timestamp(timestamp: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
