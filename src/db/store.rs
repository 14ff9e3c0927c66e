//! # Contrato de almacenamiento
//!
//! Interfaz que el motor de reservas consume para leer el catálogo y
//! mutar reservas. La implementación de producción es [`MongoRepo`];
//! los tests usan un almacén en memoria con el mismo contrato.
//!
//! Toda escritura de reservas pasa por el gestor de ciclo de vida; el
//! resto de componentes solo leen.
//!
//! [`MongoRepo`]: crate::db::MongoRepo

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::api::AppResult;
use crate::booking::lifecycle::BookingPatch;
use crate::db::models::{Booking, Branch, Restaurant, Table, User};

#[async_trait]
pub trait ReservationStore: Send + Sync {
    // ---- Catálogo (solo lectura) ----

    async fn get_user(&self, id: ObjectId) -> AppResult<Option<User>>;

    async fn get_table(&self, id: ObjectId) -> AppResult<Option<Table>>;

    async fn get_branch(&self, id: ObjectId) -> AppResult<Option<Branch>>;

    async fn get_restaurant(&self, id: ObjectId) -> AppResult<Option<Restaurant>>;

    /// Mesas de una sucursal, ordenadas por número de mesa.
    async fn tables_in_branch(&self, branch_id: ObjectId) -> AppResult<Vec<Table>>;

    // ---- Reservas ----

    /// Inserta la reserva y devuelve el registro con su identificador.
    async fn insert_booking(&self, booking: Booking) -> AppResult<Booking>;

    async fn get_booking(&self, id: ObjectId) -> AppResult<Option<Booking>>;

    /// Aplica únicamente los campos presentes en el parche y refresca
    /// `updated_at`. Devuelve el registro resultante, o `None` si la
    /// reserva ya no existe.
    async fn apply_patch(&self, id: ObjectId, patch: &BookingPatch) -> AppResult<Option<Booking>>;

    /// Borrado físico. Devuelve `false` si la reserva no existía.
    async fn delete_booking(&self, id: ObjectId) -> AppResult<bool>;

    /// Reservas no canceladas de una mesa, el conjunto contra el que se
    /// evalúa el solape. Con `exclude` se omite una reserva concreta.
    async fn active_bookings_for_table(
        &self,
        table_id: ObjectId,
        exclude: Option<ObjectId>,
    ) -> AppResult<Vec<Booking>>;

    /// Todas las reservas de un usuario, sin ordenar; el servicio de
    /// consultas filtra y ordena.
    async fn bookings_for_user(&self, user_id: ObjectId) -> AppResult<Vec<Booking>>;

    /// Página de reservas de un conjunto de mesas, ordenada por
    /// `start_time` descendente. Devuelve el total sin paginar junto a
    /// la página pedida.
    async fn bookings_for_tables(
        &self,
        table_ids: &[ObjectId],
        limit: u64,
        offset: u64,
    ) -> AppResult<(u64, Vec<Booking>)>;
}
