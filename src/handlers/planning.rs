use actix_web::{web, HttpResponse, Responder};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::domain::occupancy::{planning_grid, PLANNING_DAYS};
use crate::models::habitacion::Habitacion;
use crate::models::reserva::Reserva;

use super::ErrorResponse;

#[derive(Deserialize)]
pub struct PlanningQuery {
    pub start_date: Option<NaiveDate>,
}

/// Grilla de ocupación de 60 días; arranca en `start_date` o, si no viene,
/// en el primero del mes corriente.
pub async fn planning(
    pool: web::Data<SqlitePool>,
    params: web::Query<PlanningQuery>,
) -> impl Responder {
    let hoy = chrono::Local::now().date_naive();
    let first_day = params.start_date.unwrap_or_else(|| hoy.with_day(1).unwrap_or(hoy));
    let last_day = first_day + Duration::days(PLANNING_DAYS - 1);

    let rooms = match sqlx::query_as::<_, Habitacion>("SELECT * FROM habitaciones")
        .fetch_all(pool.get_ref())
        .await
    {
        Ok(rooms) => rooms,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    let reservas = match sqlx::query_as::<_, Reserva>(
        "SELECT * FROM reservas WHERE fecha_ingreso <= ? AND fecha_egreso >= ?",
    )
    .bind(last_day)
    .bind(first_day)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(reservas) => reservas,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    let (days, filas) = planning_grid(first_day, &rooms, &reservas);
    HttpResponse::Ok().json(serde_json::json!({
        "first_day": first_day,
        "days": days,
        "planning": filas,
    }))
}
