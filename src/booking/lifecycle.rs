//! # Gestor de ciclo de vida de reservas
//!
//! Único componente autorizado a escribir reservas. Orquesta la
//! creación, modificación y borrado validando referencias contra el
//! catálogo y consultando el comprobador de disponibilidad antes de
//! tocar el almacén; ninguna validación fallida deja estado parcial.
//!
//! ## Serialización por mesa
//!
//! La comprobación de disponibilidad y la escritura posterior se
//! ejecutan bajo un candado por mesa. Sin él, dos peticiones
//! concurrentes podrían observar la mesa libre y confirmar ambas,
//! rompiendo el invariante de no solape. El candado se mantiene durante
//! todo el ciclo comprobar-y-confirmar.

use std::sync::Arc;

use dashmap::DashMap;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::api::{AppError, AppResult, ResourceKind};
use crate::booking::availability;
use crate::booking::status::{self, BookingStatus};
use crate::db::models::Booking;
use crate::db::store::ReservationStore;
use crate::db::current_timestamp;

/// Datos de entrada para crear una reserva.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: ObjectId,
    pub table_id: ObjectId,
    pub start_time: i64,
    pub end_time: i64,
    pub special_requests: Option<String>,
}

/// Parche de modificación: solo los campos que el dominio permite
/// actualizar, cada uno opcional. Los campos ausentes conservan su
/// valor anterior.
#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub special_requests: Option<String>,
    pub status: Option<BookingStatus>,
}

impl BookingPatch {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none()
            && self.end_time.is_none()
            && self.special_requests.is_none()
            && self.status.is_none()
    }
}

/// Descriptor de confirmación de un borrado.
#[derive(Debug, Serialize)]
pub struct DeleteConfirmation {
    pub message: String,
    pub id: String,
}

pub struct LifecycleManager {
    store: Arc<dyn ReservationStore>,
    table_locks: DashMap<ObjectId, Arc<Mutex<()>>>,
}

impl LifecycleManager {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        LifecycleManager {
            store,
            table_locks: DashMap::new(),
        }
    }

    /// Candado de serialización de la mesa. Se crea perezosamente la
    /// primera vez que la mesa recibe una escritura.
    fn table_lock(&self, table_id: ObjectId) -> Arc<Mutex<()>> {
        self.table_locks
            .entry(table_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Crea una reserva en estado `pending`.
    ///
    /// # Validaciones
    /// - el intervalo debe ser válido (`end_time > start_time`)
    /// - el usuario, la mesa y la sucursal de la mesa deben existir
    /// - el intervalo no puede solapar ninguna reserva no cancelada de
    ///   la misma mesa
    ///
    /// # Errores
    /// - `InvalidInterval`: intervalo vacío o invertido
    /// - `NotFound`: usuario, mesa o sucursal inexistentes
    /// - `SlotUnavailable`: la franja ya está ocupada
    pub async fn create(&self, data: NewBooking) -> AppResult<Booking> {
        availability::validate_interval(data.start_time, data.end_time)?;

        self.store
            .get_user(data.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(ResourceKind::User, data.user_id))?;

        let table = self
            .store
            .get_table(data.table_id)
            .await?
            .ok_or_else(|| AppError::not_found(ResourceKind::Table, data.table_id))?;

        // Protege contra mesas huérfanas cuya sucursal desapareció
        self.store
            .get_branch(table.branch_id)
            .await?
            .ok_or_else(|| AppError::not_found(ResourceKind::Branch, table.branch_id))?;

        let lock = self.table_lock(data.table_id);
        let _guard = lock.lock().await;

        if !availability::is_available(
            self.store.as_ref(),
            data.table_id,
            data.start_time,
            data.end_time,
            None,
        )
        .await?
        {
            return Err(AppError::SlotUnavailable);
        }

        let now = current_timestamp();
        let booking = Booking {
            id: None,
            user_id: data.user_id,
            table_id: data.table_id,
            start_time: data.start_time,
            end_time: data.end_time,
            special_requests: data.special_requests,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert_booking(booking).await?;

        tracing::info!(
            booking_id = %created.id.map(|id| id.to_hex()).unwrap_or_default(),
            table_id = %data.table_id.to_hex(),
            "Reserva creada en estado pending"
        );

        Ok(created)
    }

    /// Modifica una reserva aplicando solo los campos presentes en el
    /// parche. Un parche vacío devuelve el registro sin cambios.
    ///
    /// Si cambia cualquiera de los dos extremos del intervalo, la
    /// disponibilidad se reevalúa contra el intervalo resultante
    /// excluyendo esta misma reserva, bajo el candado de la mesa.
    ///
    /// # Errores
    /// - `NotFound`: reserva, mesa o sucursal inexistentes
    /// - `InvalidTransition`: cambio de estado no permitido
    /// - `InvalidInterval`: el intervalo resultante es inválido
    /// - `SlotUnavailable`: el nuevo intervalo choca con otra reserva
    pub async fn update(&self, booking_id: ObjectId, patch: BookingPatch) -> AppResult<Booking> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(ResourceKind::Booking, booking_id))?;

        // Revalida las referencias: defensa frente a catálogo degradado
        let table = self
            .store
            .get_table(booking.table_id)
            .await?
            .ok_or_else(|| AppError::not_found(ResourceKind::Table, booking.table_id))?;

        self.store
            .get_branch(table.branch_id)
            .await?
            .ok_or_else(|| AppError::not_found(ResourceKind::Branch, table.branch_id))?;

        if patch.is_empty() {
            return Ok(booking);
        }

        if let Some(new_status) = patch.status {
            status::validate_transition(booking.status, new_status)?;
        }

        let time_changed = patch.start_time.is_some() || patch.end_time.is_some();

        let updated = if time_changed {
            let new_start = patch.start_time.unwrap_or(booking.start_time);
            let new_end = patch.end_time.unwrap_or(booking.end_time);
            availability::validate_interval(new_start, new_end)?;

            // El candado cubre la reevaluación y la escritura
            let lock = self.table_lock(booking.table_id);
            let _guard = lock.lock().await;

            if !availability::is_available(
                self.store.as_ref(),
                booking.table_id,
                new_start,
                new_end,
                booking.id,
            )
            .await?
            {
                return Err(AppError::SlotUnavailable);
            }

            self.store.apply_patch(booking_id, &patch).await?
        } else {
            self.store.apply_patch(booking_id, &patch).await?
        };

        let updated =
            updated.ok_or_else(|| AppError::not_found(ResourceKind::Booking, booking_id))?;

        tracing::info!(
            booking_id = %booking_id.to_hex(),
            status = %updated.status,
            "Reserva modificada"
        );

        Ok(updated)
    }

    /// Borra una reserva de forma permanente.
    ///
    /// # Errores
    /// - `NotFound`: la reserva no existe
    pub async fn delete(&self, booking_id: ObjectId) -> AppResult<DeleteConfirmation> {
        self.store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(ResourceKind::Booking, booking_id))?;

        self.store.delete_booking(booking_id).await?;

        tracing::info!(booking_id = %booking_id.to_hex(), "Reserva eliminada");

        Ok(DeleteConfirmation {
            message: "Reserva eliminada correctamente".to_string(),
            id: booking_id.to_hex(),
        })
    }
}
