//! # Comprobador de disponibilidad
//!
//! Una mesa está disponible para el intervalo `[start, end)` si ninguna
//! reserva no cancelada de esa mesa lo solapa. Los intervalos son
//! semiabiertos: dos reservas que comparten frontera (una termina justo
//! cuando empieza la otra) no se solapan, de modo que las reservas
//! consecutivas están permitidas.
//!
//! La comprobación se evalúa siempre contra el último estado confirmado
//! del almacén; la serialización frente a escrituras concurrentes de la
//! misma mesa la aporta el candado por mesa del gestor de ciclo de vida.

use mongodb::bson::oid::ObjectId;

use crate::api::{AppError, AppResult};
use crate::db::store::ReservationStore;

/// Test clásico de solape de intervalos semiabiertos `[start, end)`.
///
/// La igualdad en las fronteras no cuenta como solape.
pub fn overlaps(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    a_start < b_end && a_end > b_start
}

/// Rechaza intervalos vacíos o invertidos antes de cualquier consulta.
pub fn validate_interval(start_time: i64, end_time: i64) -> AppResult<()> {
    if end_time <= start_time {
        return Err(AppError::InvalidInterval);
    }
    Ok(())
}

/// Decide si la mesa `table_id` está libre durante `[start_time, end_time)`.
///
/// Las reservas canceladas no ocupan franja. Con `exclude` se omite una
/// reserva concreta del conjunto de solapes; el gestor de ciclo de vida lo
/// usa al modificar el horario de una reserva para no chocar consigo misma.
pub async fn is_available(
    store: &dyn ReservationStore,
    table_id: ObjectId,
    start_time: i64,
    end_time: i64,
    exclude: Option<ObjectId>,
) -> AppResult<bool> {
    validate_interval(start_time, end_time)?;

    let existing = store.active_bookings_for_table(table_id, exclude).await?;
    Ok(existing
        .iter()
        .all(|b| !overlaps(start_time, end_time, b.start_time, b.end_time)))
}
