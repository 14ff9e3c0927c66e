//! # Rezq Reservation Server
//!
//! Servidor de reservas de restaurantes multi-tenant construido con
//! Rust, Actix Web y MongoDB. Los restaurantes operan sucursales, las
//! sucursales tienen mesas físicas y los clientes reservan una mesa
//! para un intervalo de tiempo.
//!
//! ## Características principales
//!
//! - **Motor de disponibilidad**: decide si una mesa está libre en un
//!   intervalo con semántica de intervalos semiabiertos
//! - **Ciclo de vida de reservas**: creación, modificación, cancelación
//!   y borrado con validación referencial atómica
//! - **Serialización por mesa**: dos peticiones concurrentes sobre la
//!   misma mesa nunca pueden reservar franjas solapadas
//! - **API REST**: contratos JSON con timestamps ISO-8601 en UTC
//!
//! ## Configuración
//!
//! El servidor se configura mediante variables de entorno (archivo `.env`):
//!
//! ```env
//! # Base de datos MongoDB
//! MONGODB_URI=mongodb://localhost:27017
//! MONGODB_DATABASE=rezq_reservation
//!
//! # Servidor
//! BIND_ADDRESS=0.0.0.0:8080
//!
//! # Logging
//! RUST_LOG=debug,mongodb=info
//! ```
//!
//! ## Ejecución
//!
//! ```bash
//! # 1. Instalar y ejecutar MongoDB
//! # Local: mongod
//! # Docker: docker run -d --name mongo -p 27017:27017 mongo:latest
//!
//! # 2. Configurar variables de entorno
//! cp .env.example .env
//!
//! # 3. Compilar y ejecutar
//! cargo run
//! ```
//!
//! ## Arquitectura
//!
//! ```text
//! API REST (Actix Web)
//!     ↓
//! Motor de reservas (ciclo de vida / disponibilidad / consultas)
//!     ↓ MongoDB Driver
//! MongoDB Database
//! ```

use std::env;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};

mod api;
mod booking;
mod db;

use booking::lifecycle::LifecycleManager;
use booking::query::QueryService;
use db::ReservationStore;

/// Función principal que inicia el servidor web
///
/// # Funcionalidad
///
/// 1. Carga variables de entorno desde `.env`
/// 2. Configura el sistema de logging con tracing
/// 3. Establece conexión con MongoDB
/// 4. Crea índices en la base de datos
/// 5. Construye el gestor de ciclo de vida y el servicio de consultas
///    sobre un único repositorio inyectado
/// 6. Inicia el servidor HTTP en la dirección especificada
///
/// # Errores
///
/// Retorna `std::io::Error` si:
/// - No se puede conectar a MongoDB
/// - No se puede bindear al puerto especificado
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Configurar sistema de logging con tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rezq_reservation=debug".parse().unwrap())
                .add_directive("mongodb=info".parse().unwrap()),
        )
        .init();

    tracing::info!("Iniciando Rezq Reservation Server con MongoDB...");

    // Inicializar conexión a MongoDB
    let mongo_repo = match db::MongoRepo::init().await {
        Ok(repo) => {
            // Intentar crear índices para sostener los invariantes
            if let Err(e) = repo.create_indexes().await {
                tracing::warn!("Advertencia creando índices: {}", e);
                // No es un error fatal, continuamos sin índices
            }

            repo
        }
        Err(e) => {
            tracing::error!("Error conectando a MongoDB: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Error de MongoDB: {}", e),
            ));
        }
    };

    // Un único repositorio compartido; el gestor de ciclo de vida es el
    // único componente que escribe reservas
    let store: Arc<dyn ReservationStore> = Arc::new(mongo_repo);
    let lifecycle = web::Data::new(LifecycleManager::new(store.clone()));
    let queries = web::Data::new(QueryService::new(store));

    // Obtener dirección de bind desde variables de entorno
    let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    tracing::info!("Servidor iniciando en {}", bind_address);

    // Crear y configurar el servidor HTTP
    HttpServer::new(move || {
        App::new()
            .app_data(lifecycle.clone())
            .app_data(queries.clone())
            .wrap(Logger::default())
            .configure(api::init_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
