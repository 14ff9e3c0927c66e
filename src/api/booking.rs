//! # API de Reservas
//!
//! Este módulo expone las operaciones del motor de reservas:
//! - Crear nuevas reservas
//! - Modificar una reserva (horario, peticiones especiales, estado)
//! - Borrar una reserva
//! - Listar las reservas de un usuario con filtro de estado
//! - Listar las reservas de una sucursal con paginación
//!
//! Los timestamps entran y salen en ISO-8601 (UTC); los identificadores
//! son ObjectId en hexadecimal.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_object_id, AppResult};
use crate::booking::lifecycle::{BookingPatch, LifecycleManager, NewBooking};
use crate::booking::query::{QueryService, DEFAULT_PAGE_LIMIT};
use crate::booking::status::{BookingStatus, StatusFilter};
use crate::db::{datetime_from_timestamp, Booking};

/// Estructura para crear una nueva reserva
#[derive(Deserialize)]
struct CreateBookingRequest {
    /// ID del usuario que reserva (ObjectId como string)
    user_id: String,
    /// ID de la mesa a reservar (ObjectId como string)
    table_id: String,
    /// Comienzo del intervalo, ISO-8601 UTC
    start_time: DateTime<Utc>,
    /// Final del intervalo, ISO-8601 UTC, estrictamente posterior
    end_time: DateTime<Utc>,
    /// Peticiones especiales del cliente (opcional)
    special_requests: Option<String>,
}

/// Parche de modificación: todos los campos opcionales, solo los
/// presentes se aplican
#[derive(Deserialize)]
struct UpdateBookingRequest {
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    special_requests: Option<String>,
    /// Nuevo estado ("pending", "confirmed" o "cancelled")
    status: Option<String>,
}

/// Respuesta con una reserva persistida
#[derive(Serialize)]
struct BookingResponse {
    id: String,
    user_id: String,
    table_id: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    special_requests: Option<String>,
    status: BookingStatus,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        BookingResponse {
            id: booking.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: booking.user_id.to_hex(),
            table_id: booking.table_id.to_hex(),
            start_time: datetime_from_timestamp(booking.start_time),
            end_time: datetime_from_timestamp(booking.end_time),
            special_requests: booking.special_requests,
            status: booking.status,
        }
    }
}

/// Crea una nueva reserva
///
/// # Validaciones
/// - El intervalo debe ser válido (`end_time` posterior a `start_time`)
/// - El usuario, la mesa y la sucursal de la mesa deben existir
/// - La franja no puede solapar otra reserva no cancelada de la mesa
///
/// # Respuesta
/// `201 Created` con la reserva persistida en estado `pending`.
///
/// # Errores
/// - `400 Bad Request`: intervalo o identificadores inválidos
/// - `404 Not Found`: usuario, mesa o sucursal inexistentes
/// - `409 Conflict`: la franja ya está ocupada
/// - `500 Internal Server Error`: error de base de datos
#[post("/bookings")]
async fn create_booking(
    manager: web::Data<LifecycleManager>,
    data: web::Json<CreateBookingRequest>,
) -> AppResult<impl Responder> {
    let data = data.into_inner();
    let user_id = parse_object_id(&data.user_id, "user_id")?;
    let table_id = parse_object_id(&data.table_id, "table_id")?;

    let booking = manager
        .create(NewBooking {
            user_id,
            table_id,
            start_time: data.start_time.timestamp(),
            end_time: data.end_time.timestamp(),
            special_requests: data.special_requests,
        })
        .await?;

    Ok(HttpResponse::Created().json(BookingResponse::from(booking)))
}

/// Modifica una reserva existente
///
/// Aplica únicamente los campos presentes en el cuerpo; el resto
/// conserva su valor. Si cambia el horario, la disponibilidad se
/// reevalúa excluyendo esta misma reserva.
///
/// # Errores
/// - `400 Bad Request`: intervalo resultante o estado inválidos
/// - `404 Not Found`: reserva, mesa o sucursal inexistentes
/// - `409 Conflict`: nuevo horario en conflicto, o transición de estado
///   no permitida (una reserva cancelada es terminal)
#[patch("/bookings/{booking_id}")]
async fn update_booking(
    manager: web::Data<LifecycleManager>,
    path: web::Path<String>,
    data: web::Json<UpdateBookingRequest>,
) -> AppResult<impl Responder> {
    let booking_id = parse_object_id(&path.into_inner(), "booking_id")?;
    let data = data.into_inner();

    let status = match data.status.as_deref() {
        Some(value) => Some(value.parse::<BookingStatus>()?),
        None => None,
    };

    let booking = manager
        .update(
            booking_id,
            BookingPatch {
                start_time: data.start_time.map(|t| t.timestamp()),
                end_time: data.end_time.map(|t| t.timestamp()),
                special_requests: data.special_requests,
                status,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(BookingResponse::from(booking)))
}

/// Borra una reserva de forma permanente
///
/// # Errores
/// - `404 Not Found`: la reserva no existe
#[delete("/bookings/{booking_id}")]
async fn delete_booking(
    manager: web::Data<LifecycleManager>,
    path: web::Path<String>,
) -> AppResult<impl Responder> {
    let booking_id = parse_object_id(&path.into_inner(), "booking_id")?;
    let confirmation = manager.delete(booking_id).await?;
    Ok(HttpResponse::Ok().json(confirmation))
}

/// Parámetros del listado por usuario
#[derive(Deserialize)]
struct UserBookingsQuery {
    /// Filtro obligatorio: "upcoming", "past", "pending" o "cancelled"
    status: String,
}

/// Lista las reservas de un usuario según el filtro de estado
///
/// Cada fila viene compuesta con el restaurante, la dirección de la
/// sucursal y los datos de la mesa, ordenada por comienzo descendente.
/// Una lista vacía es una respuesta válida.
///
/// # Errores
/// - `400 Bad Request`: filtro no reconocido
#[get("/bookings/user/{user_id}")]
async fn get_user_bookings(
    queries: web::Data<QueryService>,
    path: web::Path<String>,
    query: web::Query<UserBookingsQuery>,
) -> AppResult<impl Responder> {
    let user_id = parse_object_id(&path.into_inner(), "user_id")?;
    let filter = query.status.parse::<StatusFilter>()?;

    let bookings = queries.list_for_user(user_id, filter).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// Parámetros de paginación del listado por sucursal
#[derive(Deserialize)]
struct BranchBookingsQuery {
    limit: Option<u64>,
    offset: Option<u64>,
}

/// Lista las reservas de una sucursal con paginación
///
/// # Respuesta
/// ```json
/// {
///   "total_count": 25,
///   "limit": 20,
///   "offset": 0,
///   "bookings": [ ... ]
/// }
/// ```
///
/// # Errores
/// - `404 Not Found`: la sucursal no existe
#[get("/bookings/branch/{branch_id}")]
async fn get_branch_bookings(
    queries: web::Data<QueryService>,
    path: web::Path<String>,
    query: web::Query<BranchBookingsQuery>,
) -> AppResult<impl Responder> {
    let branch_id = parse_object_id(&path.into_inner(), "branch_id")?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let page = queries.list_for_branch(branch_id, limit, offset).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Configura las rutas de reservas
///
/// - `POST /bookings` - Crear nueva reserva
/// - `PATCH /bookings/{id}` - Modificar una reserva
/// - `DELETE /bookings/{id}` - Borrar una reserva
/// - `GET /bookings/user/{id}?status=` - Reservas de un usuario
/// - `GET /bookings/branch/{id}?limit=&offset=` - Reservas de una sucursal
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_booking);
    cfg.service(update_booking);
    cfg.service(delete_booking);
    cfg.service(get_user_bookings);
    cfg.service(get_branch_bookings);
}
