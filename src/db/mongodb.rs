//! # Repositorio MongoDB
//!
//! Conexión y acceso a las colecciones de la plataforma. El repositorio
//! se construye una sola vez al arrancar el proceso y se inyecta por
//! referencia en cada componente; nunca hay estado de conexión global.
//!
//! ## Configuración
//!
//! - `MONGODB_URI`: URI de conexión (default: mongodb://localhost:27017)
//! - `MONGODB_DATABASE`: nombre de la base de datos (default: rezq_reservation)

use std::env;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Cursor, Database};
use serde::de::DeserializeOwned;

use crate::api::{AppError, AppResult};
use crate::booking::lifecycle::BookingPatch;
use crate::db::models::{Booking, Branch, Restaurant, Table, User};
use crate::db::store::ReservationStore;
use crate::db::current_timestamp;

#[derive(Debug, Clone)]
pub struct MongoRepo {
    pub client: Client,
    pub database: Database,
}

impl MongoRepo {
    /// Establece la conexión y verifica que el servidor responde.
    pub async fn init() -> AppResult<MongoRepo> {
        let mongo_uri = env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let client = Client::with_uri_str(&mongo_uri)
            .await
            .map_err(|e| AppError::internal(format!("Error conectando a MongoDB: {}", e)))?;

        let database_name = env::var("MONGODB_DATABASE")
            .unwrap_or_else(|_| "rezq_reservation".to_string());

        let database = client.database(&database_name);

        // Test connection
        database
            .run_command(doc! {"ping": 1})
            .await
            .map_err(|e| AppError::internal(format!("Error validando conexión MongoDB: {}", e)))?;

        tracing::info!("Conexión a MongoDB establecida exitosamente");

        Ok(MongoRepo { client, database })
    }

    pub fn users(&self) -> Collection<User> {
        self.database.collection("users")
    }

    pub fn restaurants(&self) -> Collection<Restaurant> {
        self.database.collection("restaurants")
    }

    pub fn branches(&self) -> Collection<Branch> {
        self.database.collection("branches")
    }

    pub fn tables(&self) -> Collection<Table> {
        self.database.collection("tables")
    }

    pub fn bookings(&self) -> Collection<Booking> {
        self.database.collection("bookings")
    }

    /// Crea los índices que sostienen los invariantes del catálogo y las
    /// consultas del motor. No es fatal si falla: el servidor arranca y
    /// lo deja registrado.
    pub async fn create_indexes(&self) -> AppResult<()> {
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        // Índices para mesas: número único dentro de su sucursal
        let table_indexes = vec![
            IndexModel::builder().keys(doc! { "branch_id": 1 }).build(),
            IndexModel::builder()
                .keys(doc! { "branch_id": 1, "table_number": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        ];

        self.tables()
            .create_indexes(table_indexes)
            .await
            .map_err(|e| AppError::internal(format!("Error creando índices de mesas: {}", e)))?;

        // Índices para sucursales
        let branch_indexes = vec![IndexModel::builder()
            .keys(doc! { "restaurant_id": 1 })
            .build()];

        self.branches()
            .create_indexes(branch_indexes)
            .await
            .map_err(|e| AppError::internal(format!("Error creando índices de sucursales: {}", e)))?;

        // Índices para reservas: la consulta de solape recorre la mesa
        // por franja, y los listados filtran por usuario y estado
        let booking_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "table_id": 1, "start_time": 1 })
                .build(),
            IndexModel::builder().keys(doc! { "user_id": 1 }).build(),
            IndexModel::builder().keys(doc! { "status": 1 }).build(),
        ];

        self.bookings()
            .create_indexes(booking_indexes)
            .await
            .map_err(|e| AppError::internal(format!("Error creando índices de reservas: {}", e)))?;

        tracing::info!("Índices MongoDB creados exitosamente");
        Ok(())
    }

    /// Agota un cursor deserializando cada documento.
    async fn collect<T>(operation: &str, mut cursor: Cursor<T>) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let mut results = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| AppError::database(operation, e))?
        {
            let item = cursor
                .deserialize_current()
                .map_err(|e| AppError::database(operation, e))?;
            results.push(item);
        }
        Ok(results)
    }
}

#[async_trait]
impl ReservationStore for MongoRepo {
    async fn get_user(&self, id: ObjectId) -> AppResult<Option<User>> {
        self.users()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("get_user", e))
    }

    async fn get_table(&self, id: ObjectId) -> AppResult<Option<Table>> {
        self.tables()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("get_table", e))
    }

    async fn get_branch(&self, id: ObjectId) -> AppResult<Option<Branch>> {
        self.branches()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("get_branch", e))
    }

    async fn get_restaurant(&self, id: ObjectId) -> AppResult<Option<Restaurant>> {
        self.restaurants()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("get_restaurant", e))
    }

    async fn tables_in_branch(&self, branch_id: ObjectId) -> AppResult<Vec<Table>> {
        let cursor = self
            .tables()
            .find(doc! { "branch_id": branch_id })
            .sort(doc! { "table_number": 1 })
            .await
            .map_err(|e| AppError::database("tables_in_branch", e))?;

        Self::collect("tables_in_branch", cursor).await
    }

    async fn insert_booking(&self, mut booking: Booking) -> AppResult<Booking> {
        let result = self
            .bookings()
            .insert_one(&booking)
            .await
            .map_err(|e| AppError::database("insert_booking", e))?;

        booking.id = result.inserted_id.as_object_id();
        Ok(booking)
    }

    async fn get_booking(&self, id: ObjectId) -> AppResult<Option<Booking>> {
        self.bookings()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("get_booking", e))
    }

    async fn apply_patch(&self, id: ObjectId, patch: &BookingPatch) -> AppResult<Option<Booking>> {
        // Solo los campos presentes en el parche entran en el $set;
        // nunca se construye la actualización desde un mapa dinámico.
        let mut set = doc! { "updated_at": current_timestamp() };
        if let Some(start_time) = patch.start_time {
            set.insert("start_time", start_time);
        }
        if let Some(end_time) = patch.end_time {
            set.insert("end_time", end_time);
        }
        if let Some(special_requests) = &patch.special_requests {
            set.insert("special_requests", special_requests.as_str());
        }
        if let Some(status) = patch.status {
            set.insert("status", status.as_str());
        }

        self.bookings()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| AppError::database("apply_patch", e))
    }

    async fn delete_booking(&self, id: ObjectId) -> AppResult<bool> {
        let result = self
            .bookings()
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::database("delete_booking", e))?;

        Ok(result.deleted_count > 0)
    }

    async fn active_bookings_for_table(
        &self,
        table_id: ObjectId,
        exclude: Option<ObjectId>,
    ) -> AppResult<Vec<Booking>> {
        let mut filter = doc! {
            "table_id": table_id,
            "status": { "$ne": "cancelled" },
        };
        if let Some(excluded) = exclude {
            filter.insert("_id", doc! { "$ne": excluded });
        }

        let cursor = self
            .bookings()
            .find(filter)
            .await
            .map_err(|e| AppError::database("active_bookings_for_table", e))?;

        Self::collect("active_bookings_for_table", cursor).await
    }

    async fn bookings_for_user(&self, user_id: ObjectId) -> AppResult<Vec<Booking>> {
        let cursor = self
            .bookings()
            .find(doc! { "user_id": user_id })
            .await
            .map_err(|e| AppError::database("bookings_for_user", e))?;

        Self::collect("bookings_for_user", cursor).await
    }

    async fn bookings_for_tables(
        &self,
        table_ids: &[ObjectId],
        limit: u64,
        offset: u64,
    ) -> AppResult<(u64, Vec<Booking>)> {
        let filter: Document = doc! { "table_id": { "$in": table_ids.to_vec() } };

        let total = self
            .bookings()
            .count_documents(filter.clone())
            .await
            .map_err(|e| AppError::database("bookings_for_tables", e))?;

        let cursor = self
            .bookings()
            .find(filter)
            .sort(doc! { "start_time": -1 })
            .skip(offset)
            .limit(limit as i64)
            .await
            .map_err(|e| AppError::database("bookings_for_tables", e))?;

        let page = Self::collect("bookings_for_tables", cursor).await?;
        Ok((total, page))
    }
}
