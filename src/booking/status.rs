//! # Máquina de estados de reserva
//!
//! Una reserva nace en estado `pending` y puede pasar a `confirmed` o
//! `cancelled`. La cancelación es terminal: una reserva cancelada no
//! vuelve a ocupar su franja ni admite más transiciones.
//!
//! Aquí vive también [`StatusFilter`], el filtro temporal derivado del
//! estado que usa el listado de reservas por usuario.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::{AppError, AppResult};

/// Estado de una reserva tal y como se persiste y se expone por la API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Representación en minúsculas, idéntica a la almacenada en MongoDB.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(AppError::Validation(format!(
                "Estado de reserva inválido: '{}'",
                other
            ))),
        }
    }
}

/// Comprueba que la transición `from` a `to` está permitida.
///
/// Reglas:
/// - escribir el mismo estado es una operación neutra y siempre se acepta
/// - `pending` y `confirmed` pueden intercambiarse y cancelarse
/// - `cancelled` es terminal
pub fn validate_transition(from: BookingStatus, to: BookingStatus) -> AppResult<()> {
    if from == to {
        return Ok(());
    }
    match from {
        BookingStatus::Cancelled => Err(AppError::InvalidTransition { from, to }),
        BookingStatus::Pending | BookingStatus::Confirmed => Ok(()),
    }
}

/// Filtro de listado de reservas por usuario.
///
/// No es un estado almacenado: combina el estado con la posición del
/// comienzo de la reserva respecto al instante actual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Confirmadas que aún no han comenzado.
    Upcoming,
    /// Confirmadas que ya comenzaron.
    Past,
    /// Pendientes que aún no han comenzado.
    Pending,
    /// Canceladas, sin límite temporal.
    Cancelled,
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "upcoming" => Ok(StatusFilter::Upcoming),
            "past" => Ok(StatusFilter::Past),
            "pending" => Ok(StatusFilter::Pending),
            "cancelled" => Ok(StatusFilter::Cancelled),
            other => Err(AppError::InvalidFilter(other.to_string())),
        }
    }
}

impl StatusFilter {
    /// Decide si una reserva con `status` y `start_time` cae dentro del
    /// filtro evaluado en el instante `now`.
    pub fn matches(&self, status: BookingStatus, start_time: i64, now: i64) -> bool {
        match self {
            StatusFilter::Upcoming => status == BookingStatus::Confirmed && start_time > now,
            StatusFilter::Past => status == BookingStatus::Confirmed && start_time < now,
            StatusFilter::Pending => status == BookingStatus::Pending && start_time > now,
            StatusFilter::Cancelled => status == BookingStatus::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transiciones_desde_pending_y_confirmed() {
        assert!(validate_transition(BookingStatus::Pending, BookingStatus::Confirmed).is_ok());
        assert!(validate_transition(BookingStatus::Confirmed, BookingStatus::Pending).is_ok());
        assert!(validate_transition(BookingStatus::Pending, BookingStatus::Cancelled).is_ok());
        assert!(validate_transition(BookingStatus::Confirmed, BookingStatus::Cancelled).is_ok());
    }

    #[test]
    fn cancelled_es_terminal() {
        let err = validate_transition(BookingStatus::Cancelled, BookingStatus::Pending);
        assert!(matches!(err, Err(AppError::InvalidTransition { .. })));
        let err = validate_transition(BookingStatus::Cancelled, BookingStatus::Confirmed);
        assert!(matches!(err, Err(AppError::InvalidTransition { .. })));
    }

    #[test]
    fn reescribir_el_mismo_estado_es_neutro() {
        assert!(validate_transition(BookingStatus::Cancelled, BookingStatus::Cancelled).is_ok());
        assert!(validate_transition(BookingStatus::Pending, BookingStatus::Pending).is_ok());
    }

    #[test]
    fn parseo_de_filtros() {
        assert_eq!("upcoming".parse::<StatusFilter>().unwrap(), StatusFilter::Upcoming);
        assert_eq!("past".parse::<StatusFilter>().unwrap(), StatusFilter::Past);
        assert_eq!("pending".parse::<StatusFilter>().unwrap(), StatusFilter::Pending);
        assert_eq!("cancelled".parse::<StatusFilter>().unwrap(), StatusFilter::Cancelled);

        let err = "archived".parse::<StatusFilter>();
        assert!(matches!(err, Err(AppError::InvalidFilter(ref v)) if v == "archived"));
    }

    #[test]
    fn semantica_de_los_filtros() {
        let now = 1_000;

        // upcoming: confirmada y en el futuro
        assert!(StatusFilter::Upcoming.matches(BookingStatus::Confirmed, 2_000, now));
        assert!(!StatusFilter::Upcoming.matches(BookingStatus::Confirmed, 500, now));
        assert!(!StatusFilter::Upcoming.matches(BookingStatus::Pending, 2_000, now));

        // past: confirmada y en el pasado
        assert!(StatusFilter::Past.matches(BookingStatus::Confirmed, 500, now));
        assert!(!StatusFilter::Past.matches(BookingStatus::Cancelled, 500, now));

        // pending: pendiente y en el futuro
        assert!(StatusFilter::Pending.matches(BookingStatus::Pending, 2_000, now));
        assert!(!StatusFilter::Pending.matches(BookingStatus::Pending, 500, now));

        // cancelled: sin límite temporal
        assert!(StatusFilter::Cancelled.matches(BookingStatus::Cancelled, 500, now));
        assert!(StatusFilter::Cancelled.matches(BookingStatus::Cancelled, 2_000, now));
    }

    #[test]
    fn parseo_de_estados() {
        assert_eq!("pending".parse::<BookingStatus>().unwrap(), BookingStatus::Pending);
        assert_eq!("confirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert_eq!("cancelled".parse::<BookingStatus>().unwrap(), BookingStatus::Cancelled);
        assert!(matches!(
            "archived".parse::<BookingStatus>(),
            Err(AppError::Validation(_))
        ));
    }
}
