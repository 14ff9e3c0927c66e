//! # Manejo de errores con thiserror
//!
//! Taxonomía cerrada de errores del motor de reservas. Cada operación
//! devuelve un `Result` con una de estas variantes; el manejo es
//! exhaustivo y comprobado por el compilador, nunca objetos ad hoc
//! lanzados como control de flujo.

use std::fmt;

use actix_web::{HttpResponse, ResponseError};
use actix_web::http::StatusCode;
use thiserror::Error;

use crate::booking::status::BookingStatus;

/// Recurso referenciado por una reserva que puede no existir.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Table,
    Branch,
    Booking,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::User => "usuario",
            ResourceKind::Table => "mesa",
            ResourceKind::Branch => "sucursal",
            ResourceKind::Booking => "reserva",
        };
        f.write_str(name)
    }
}

/// Tipos de error de la aplicación.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referencia a un usuario, mesa, sucursal o reserva inexistente.
    #[error("No encontrado: {resource} con ID '{id}'")]
    NotFound { resource: ResourceKind, id: String },

    /// El intervalo pedido choca con una reserva no cancelada de la
    /// misma mesa.
    #[error("La mesa ya tiene una reserva que solapa el intervalo solicitado")]
    SlotUnavailable,

    /// Intervalo vacío o invertido.
    #[error("Intervalo inválido: end_time debe ser posterior a start_time")]
    InvalidInterval,

    /// Valor de filtro de estado no reconocido en un listado.
    #[error("Filtro de estado inválido: '{0}'")]
    InvalidFilter(String),

    /// Cambio de estado que la máquina de estados no permite.
    #[error("Transición de estado no permitida: de '{from}' a '{to}'")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// Error de validación de entrada.
    #[error("Error de validación: {0}")]
    Validation(String),

    /// Error de base de datos con contexto de operación.
    ///
    /// Mantiene la cadena de errores original para mejor debugging.
    #[error("Error de base de datos en operación '{operation}': {source}")]
    Database {
        operation: String,
        #[source]
        source: mongodb::error::Error,
    },

    /// Error interno con código de rastreo.
    #[error("Error interno (trace: {trace_id}): {message}")]
    Internal { trace_id: String, message: String },
}

impl AppError {
    /// Crea un error de recurso no encontrado a partir de su ObjectId.
    pub fn not_found(resource: ResourceKind, id: mongodb::bson::oid::ObjectId) -> Self {
        Self::NotFound {
            resource,
            id: id.to_hex(),
        }
    }

    /// Crea un error de base de datos con contexto de operación.
    pub fn database(operation: &str, source: impl Into<mongodb::error::Error>) -> Self {
        Self::Database {
            operation: operation.to_string(),
            source: source.into(),
        }
    }

    /// Crea un error interno con trace ID generado.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            trace_id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
        }
    }

    /// Clasificación estable del error, la que ven los clientes de la API.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::SlotUnavailable => "slot_unavailable",
            Self::InvalidInterval => "invalid_interval",
            Self::InvalidFilter(_) => "invalid_filter",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Validation(_) => "validation",
            Self::Database { .. } => "storage_failure",
            Self::Internal { .. } => "internal",
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::SlotUnavailable | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::InvalidInterval | Self::InvalidFilter(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Log detallado del error antes de responder
        match self {
            Self::Database { operation, source } => {
                tracing::error!(
                    operation = %operation,
                    error = %source,
                    "Database error occurred"
                );
            }
            Self::Internal { trace_id, message } => {
                tracing::error!(
                    trace_id = %trace_id,
                    message = %message,
                    "Internal error with trace"
                );
            }
            Self::NotFound { resource, id } => {
                tracing::info!(
                    resource = %resource,
                    id = %id,
                    "Resource not found"
                );
            }
            Self::SlotUnavailable => {
                tracing::info!("Slot conflict rejected");
            }
            other => {
                tracing::warn!(
                    kind = %other.kind(),
                    error = %other,
                    "Validation error"
                );
            }
        }

        let message = match self {
            // No se filtran detalles internos al cliente
            Self::Database { .. } => "Error interno del servidor".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.kind().to_string(),
            message,
        })
    }
}

pub type AppResult<T> = Result<T, AppError>;
