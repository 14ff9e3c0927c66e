//! # Servicio de consultas de reservas
//!
//! Vistas de solo lectura: listado por usuario con filtro temporal,
//! listado paginado por sucursal y búsqueda de mesas disponibles. Las
//! vistas se componen con los datos de presentación del catálogo
//! (restaurante, sucursal, mesa y cliente); las referencias colgantes se
//! omiten del resultado, igual que haría una join interna.
//!
//! Un resultado vacío no es un error en esta capa.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::api::{AppError, AppResult, ResourceKind};
use crate::booking::availability;
use crate::booking::status::{BookingStatus, StatusFilter};
use crate::db::models::Table;
use crate::db::store::ReservationStore;
use crate::db::{current_timestamp, datetime_from_timestamp};

/// Límite de página por defecto del listado por sucursal.
pub const DEFAULT_PAGE_LIMIT: u64 = 20;

/// Fila del listado de reservas de un usuario, con los datos de
/// presentación del restaurante y la mesa.
#[derive(Debug, Serialize)]
pub struct UserBookingView {
    pub id: String,
    pub restaurant_name: String,
    pub branch_address: String,
    pub persons: i32,
    pub table_number: i32,
    pub floor: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Fila del listado de reservas de una sucursal.
#[derive(Debug, Serialize)]
pub struct BranchBookingView {
    pub id: String,
    pub user_id: String,
    pub customer_name: String,
    pub table_number: i32,
    pub floor: i32,
    pub max_capacity: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Página de reservas de una sucursal con el total para paginar.
#[derive(Debug, Serialize)]
pub struct BranchBookingsPage {
    pub total_count: u64,
    pub limit: u64,
    pub offset: u64,
    pub bookings: Vec<BranchBookingView>,
}

pub struct QueryService {
    store: Arc<dyn ReservationStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        QueryService { store }
    }

    /// Reservas de un usuario según el filtro, ordenadas por comienzo
    /// descendente.
    pub async fn list_for_user(
        &self,
        user_id: ObjectId,
        filter: StatusFilter,
    ) -> AppResult<Vec<UserBookingView>> {
        let now = current_timestamp();

        let mut bookings = self.store.bookings_for_user(user_id).await?;
        bookings.retain(|b| filter.matches(b.status, b.start_time, now));
        bookings.sort_by_key(|b| std::cmp::Reverse(b.start_time));

        let mut views = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let Some(table) = self.store.get_table(booking.table_id).await? else {
                continue;
            };
            let Some(branch) = self.store.get_branch(table.branch_id).await? else {
                continue;
            };
            let Some(restaurant) = self.store.get_restaurant(branch.restaurant_id).await? else {
                continue;
            };

            views.push(UserBookingView {
                id: booking.id.map(|id| id.to_hex()).unwrap_or_default(),
                restaurant_name: restaurant.name,
                branch_address: branch.address,
                persons: table.max_capacity,
                table_number: table.table_number,
                floor: table.floor,
                start_time: datetime_from_timestamp(booking.start_time),
                end_time: datetime_from_timestamp(booking.end_time),
                status: booking.status,
            });
        }

        Ok(views)
    }

    /// Página de reservas de una sucursal, ordenada por comienzo
    /// descendente, con el total sin paginar.
    ///
    /// # Errores
    /// - `NotFound`: la sucursal no existe
    pub async fn list_for_branch(
        &self,
        branch_id: ObjectId,
        limit: u64,
        offset: u64,
    ) -> AppResult<BranchBookingsPage> {
        self.store
            .get_branch(branch_id)
            .await?
            .ok_or_else(|| AppError::not_found(ResourceKind::Branch, branch_id))?;

        let tables = self.store.tables_in_branch(branch_id).await?;
        let table_ids: Vec<ObjectId> = tables.iter().filter_map(|t| t.id).collect();
        let by_id: HashMap<ObjectId, &Table> =
            tables.iter().filter_map(|t| t.id.map(|id| (id, t))).collect();

        let (total_count, page) = self
            .store
            .bookings_for_tables(&table_ids, limit, offset)
            .await?;

        let mut bookings = Vec::with_capacity(page.len());
        for booking in page {
            let Some(table) = by_id.get(&booking.table_id) else {
                continue;
            };
            let Some(user) = self.store.get_user(booking.user_id).await? else {
                continue;
            };

            bookings.push(BranchBookingView {
                id: booking.id.map(|id| id.to_hex()).unwrap_or_default(),
                user_id: booking.user_id.to_hex(),
                customer_name: user.name,
                table_number: table.table_number,
                floor: table.floor,
                max_capacity: table.max_capacity,
                start_time: datetime_from_timestamp(booking.start_time),
                end_time: datetime_from_timestamp(booking.end_time),
                status: booking.status,
            });
        }

        Ok(BranchBookingsPage {
            total_count,
            limit,
            offset,
            bookings,
        })
    }

    /// Mesas de la sucursal con capacidad suficiente y sin reservas que
    /// solapen el intervalo pedido, ordenadas por número de mesa.
    ///
    /// # Errores
    /// - `NotFound`: la sucursal no existe
    /// - `InvalidInterval`: intervalo vacío o invertido
    /// - `Validation`: número de comensales no positivo
    pub async fn list_available_tables(
        &self,
        branch_id: ObjectId,
        party_size: i32,
        start_time: i64,
        end_time: i64,
    ) -> AppResult<Vec<Table>> {
        availability::validate_interval(start_time, end_time)?;

        if party_size <= 0 {
            return Err(AppError::Validation(
                "El número de comensales debe ser mayor a 0".to_string(),
            ));
        }

        self.store
            .get_branch(branch_id)
            .await?
            .ok_or_else(|| AppError::not_found(ResourceKind::Branch, branch_id))?;

        let tables = self.store.tables_in_branch(branch_id).await?;
        let mut available = Vec::new();

        for table in tables {
            if table.max_capacity < party_size {
                continue;
            }
            let Some(table_id) = table.id else {
                continue;
            };
            if availability::is_available(self.store.as_ref(), table_id, start_time, end_time, None)
                .await?
            {
                available.push(table);
            }
        }

        available.sort_by_key(|t| t.table_number);
        Ok(available)
    }
}
