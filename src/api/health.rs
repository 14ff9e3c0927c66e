use actix_web::{get, web, HttpResponse, Responder};

#[get("/health")]
async fn get_health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_health);
}
