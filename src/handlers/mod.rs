pub mod estadisticas;
pub mod habitaciones;
pub mod planning;
pub mod reservas;

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::domain::DomainError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        ErrorResponse { error: msg.into() }
    }
}

/// Rechazo de una operación de dominio con su código HTTP: rango inválido
/// es un pedido mal armado, el resto son conflictos con el estado actual.
pub fn domain_error_response(err: &DomainError) -> HttpResponse {
    match err {
        DomainError::InvalidRange => HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string())),
        DomainError::InsufficientCapacity { index } => HttpResponse::Conflict().json(
            serde_json::json!({ "error": err.to_string(), "pedido": index }),
        ),
        DomainError::DoubleBooking { numero } => HttpResponse::Conflict().json(
            serde_json::json!({ "error": err.to_string(), "habitacion": numero }),
        ),
    }
}

/// Rutas del servicio; `main` las monta bajo `/api` y los tests las montan
/// igual sobre un pool de prueba.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/habitaciones")
            .route("/disponibles", web::get().to(habitaciones::disponibles))
            .route("/estado", web::get().to(habitaciones::estado))
            .route("", web::get().to(habitaciones::get_habitaciones))
            .route("", web::post().to(habitaciones::create_habitacion))
            .route("/{id}", web::get().to(habitaciones::get_habitacion_by_id))
            .route("/{id}", web::put().to(habitaciones::update_habitacion))
            .route("/{id}", web::delete().to(habitaciones::delete_habitacion)),
    )
    .service(
        web::scope("/reservas")
            .route("/plan", web::post().to(reservas::plan_reserva))
            .route("/hoy", web::get().to(reservas::reservas_hoy))
            .route("/checkins", web::get().to(reservas::checkins))
            .route("/checkouts", web::get().to(reservas::checkouts))
            .route("/por-fecha", web::get().to(reservas::por_fecha))
            .route("/limpieza", web::get().to(reservas::limpieza))
            .route("", web::get().to(reservas::get_reservas))
            .route("", web::post().to(reservas::create_reserva))
            .route("/{id}", web::get().to(reservas::get_reserva_by_id))
            .route("/{id}", web::put().to(reservas::update_reserva))
            .route("/{id}", web::delete().to(reservas::delete_reserva)),
    )
    .service(
        web::scope("/estadisticas")
            .route("/kpis/comparacion", web::get().to(estadisticas::kpis_comparacion))
            .route("/kpis", web::get().to(estadisticas::kpis))
            .route("", web::get().to(estadisticas::resumen)),
    )
    .route("/planning", web::get().to(planning::planning));
}
