use actix_web::{get, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_object_id, AppResult};
use crate::booking::query::QueryService;
use crate::db::Table;

#[derive(Deserialize)]
struct AvailableTablesQuery {
    branch_id: String,
    party_size: i32,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

#[derive(Serialize)]
struct TableResponse {
    id: String,
    branch_id: String,
    table_number: i32,
    max_capacity: i32,
    is_side_table: bool,
    is_open_space: bool,
    floor: i32,
}

impl From<Table> for TableResponse {
    fn from(table: Table) -> Self {
        TableResponse {
            id: table.id.map(|id| id.to_hex()).unwrap_or_default(),
            branch_id: table.branch_id.to_hex(),
            table_number: table.table_number,
            max_capacity: table.max_capacity,
            is_side_table: table.is_side_table,
            is_open_space: table.is_open_space,
            floor: table.floor,
        }
    }
}

/// Mesas de una sucursal con capacidad para el grupo y libres durante
/// el intervalo pedido.
#[get("/tables/available")]
async fn get_available_tables(
    queries: web::Data<QueryService>,
    query: web::Query<AvailableTablesQuery>,
) -> AppResult<impl Responder> {
    let branch_id = parse_object_id(&query.branch_id, "branch_id")?;

    let tables = queries
        .list_available_tables(
            branch_id,
            query.party_size,
            query.start_time.timestamp(),
            query.end_time.timestamp(),
        )
        .await?;

    let response: Vec<TableResponse> = tables.into_iter().map(TableResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_available_tables);
}
