//! # Modelos de datos
//!
//! Entidades persistidas en MongoDB. El catálogo (usuarios, restaurantes,
//! sucursales y mesas) es de solo lectura para el motor de reservas; la
//! única entidad que el motor modifica es [`Booking`].

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::booking::status::BookingStatus;

/// Usuario que realiza reservas. Propiedad del colaborador de identidad;
/// el motor solo lo consulta para validar referencias.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Nunca se expone por la API; lo gestiona el colaborador de credenciales.
    pub hashed_password: String,
    pub created_at: i64, // timestamp unix
}

/// Restaurante con sus etiquetas de cocina (relación muchos a muchos).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Restaurant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default)]
    pub cuisine_ids: Vec<ObjectId>,
    pub created_at: i64, // timestamp unix
}

/// Sucursal física de un restaurante. Invariante: el restaurante debe
/// existir antes de crear la sucursal.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Branch {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub restaurant_id: ObjectId,
    pub city: String,
    pub country: String,
    pub address: String,
    /// Geolocalización en texto libre ("lat,lng").
    pub location: String,
    pub created_at: i64, // timestamp unix
}

/// Mesa reservable dentro de una sucursal.
///
/// Invariante: `(branch_id, table_number)` es único; se aplica con un
/// índice compuesto creado al arrancar el proceso.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Table {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub branch_id: ObjectId,
    pub table_number: i32,
    pub max_capacity: i32,
    pub is_side_table: bool,
    pub is_open_space: bool,
    pub floor: i32,
    pub created_at: i64, // timestamp unix
}

/// Reserva de una mesa por un usuario durante un intervalo `[start, end)`.
///
/// Invariantes:
/// 1. `table_id` y `user_id` referencian registros existentes.
/// 2. Dos reservas no canceladas de la misma mesa nunca se solapan.
/// 3. `end_time` es estrictamente mayor que `start_time`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub table_id: ObjectId,
    pub start_time: i64, // timestamp unix
    pub end_time: i64,   // timestamp unix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub created_at: i64, // timestamp unix
    pub updated_at: i64, // timestamp unix
}
