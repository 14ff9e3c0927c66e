//! # Módulo API
//!
//! Este módulo contiene las rutas y controladores de la API REST.
//!
//! ## Módulos principales
//!
//! - [`booking`] - Ciclo de vida y listados de reservas
//! - [`table`] - Búsqueda de mesas disponibles
//! - [`health`] - Sonda de vida del servicio
//! - [`errors`] - Manejo de errores de la aplicación

pub mod booking;
pub mod errors;
pub mod health;
pub mod table;

// Re-exportar tipos comunes para facilitar su uso
pub use errors::{AppError, AppResult, ErrorResponse, ResourceKind};

use actix_web::web;
use mongodb::bson::oid::ObjectId;

/// Configura todas las rutas de la API
///
/// # Rutas configuradas
///
/// - `/bookings/*` - Ver [`booking::routes`]
/// - `/tables/*` - Ver [`table::routes`]
/// - `/health` - Ver [`health::routes`]
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    booking::routes(cfg);
    table::routes(cfg);
    health::routes(cfg);
}

/// Parsea un ObjectId hexadecimal recibido por la API.
pub(crate) fn parse_object_id(value: &str, field: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(value).map_err(|_| {
        AppError::Validation(format!("ID inválido en '{}': '{}'", field, value))
    })
}
