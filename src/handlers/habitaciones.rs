use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::domain::availability::find_available_rooms;
use crate::domain::occupancy::room_status_on;
use crate::models::habitacion::{CreateHabitacion, Habitacion, TipoHabitacion};
use crate::models::reserva::Reserva;

use super::{domain_error_response, ErrorResponse};

#[derive(Deserialize)]
pub struct HabitacionFilter {
    pub tipo: Option<TipoHabitacion>,
}

pub async fn get_habitaciones(
    pool: web::Data<SqlitePool>,
    params: web::Query<HabitacionFilter>,
) -> impl Responder {
    let result = match params.tipo {
        Some(tipo) => {
            sqlx::query_as::<_, Habitacion>(
                "SELECT * FROM habitaciones WHERE tipo = ? ORDER BY numero",
            )
            .bind(tipo)
            .fetch_all(pool.get_ref())
            .await
        }
        None => {
            sqlx::query_as::<_, Habitacion>("SELECT * FROM habitaciones ORDER BY numero")
                .fetch_all(pool.get_ref())
                .await
        }
    };

    match result {
        Ok(habitaciones) => HttpResponse::Ok().json(habitaciones),
        Err(e) => {
            log::error!("error listando habitaciones: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

pub async fn get_habitacion_by_id(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> impl Responder {
    let id = path.into_inner();

    match sqlx::query_as::<_, Habitacion>("SELECT * FROM habitaciones WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some(habitacion)) => HttpResponse::Ok().json(habitacion),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::new("Habitación no encontrada")),
        Err(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

pub async fn create_habitacion(
    pool: web::Data<SqlitePool>,
    body: web::Json<CreateHabitacion>,
) -> impl Responder {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(e);
    }

    let result = sqlx::query_as::<_, Habitacion>(
        "INSERT INTO habitaciones (numero, tipo, piso) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(&body.numero)
    .bind(body.tipo)
    .bind(&body.piso)
    .fetch_one(pool.get_ref())
    .await;

    match result {
        Ok(habitacion) => HttpResponse::Created().json(habitacion),
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            HttpResponse::Conflict().json(ErrorResponse::new(format!(
                "Ya existe la habitación {}",
                body.numero
            )))
        }
        Err(e) => {
            log::error!("error creando habitación: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

pub async fn update_habitacion(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<CreateHabitacion>,
) -> impl Responder {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(e);
    }
    let id = path.into_inner();

    let result = sqlx::query_as::<_, Habitacion>(
        "UPDATE habitaciones SET numero = ?, tipo = ?, piso = ? WHERE id = ? RETURNING *",
    )
    .bind(&body.numero)
    .bind(body.tipo)
    .bind(&body.piso)
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await;

    match result {
        Ok(Some(habitacion)) => HttpResponse::Ok().json(habitacion),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::new("Habitación no encontrada")),
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            HttpResponse::Conflict().json(ErrorResponse::new(format!(
                "Ya existe la habitación {}",
                body.numero
            )))
        }
        Err(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

pub async fn delete_habitacion(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> impl Responder {
    let id = path.into_inner();

    match sqlx::query("DELETE FROM habitaciones WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
    {
        Ok(done) if done.rows_affected() > 0 => HttpResponse::Ok().json(serde_json::json!({
            "message": "Habitación eliminada",
            "id": id,
        })),
        Ok(_) => HttpResponse::NotFound().json(ErrorResponse::new("Habitación no encontrada")),
        Err(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

#[derive(Deserialize)]
pub struct DisponiblesQuery {
    pub fecha_ingreso: NaiveDate,
    pub fecha_egreso: NaiveDate,
    pub personas: Option<i64>,
    pub excluir_reserva: Option<i64>,
}

/// Habitaciones libres en `[fecha_ingreso, fecha_egreso)`, con filtro
/// opcional de capacidad. `excluir_reserva` se usa al editar una reserva.
pub async fn disponibles(
    pool: web::Data<SqlitePool>,
    params: web::Query<DisponiblesQuery>,
) -> impl Responder {
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

    // Solo las reservas que tocan el rango pedido.
    let reservas = match sqlx::query_as::<_, Reserva>(
        "SELECT * FROM reservas WHERE fecha_ingreso < ? AND fecha_egreso > ?",
    )
    .bind(params.fecha_egreso)
    .bind(params.fecha_ingreso)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(reservas) => reservas,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    match find_available_rooms(
        params.fecha_ingreso,
        params.fecha_egreso,
        params.personas,
        &rooms,
        &reservas,
        params.excluir_reserva,
    ) {
        Ok(libres) => HttpResponse::Ok().json(libres),
        Err(err) => domain_error_response(&err),
    }
}

#[derive(Deserialize)]
pub struct EstadoQuery {
    pub fecha: Option<NaiveDate>,
}

/// Estado ocupada/libre de cada habitación para un día (hoy por defecto).
pub async fn estado(
    pool: web::Data<SqlitePool>,
    params: web::Query<EstadoQuery>,
) -> impl Responder {
    let fecha = params
        .fecha
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let rooms = match sqlx::query_as::<_, Habitacion>("SELECT * FROM habitaciones ORDER BY numero")
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
        "SELECT * FROM reservas WHERE fecha_ingreso <= ? AND fecha_egreso > ?",
    )
    .bind(fecha)
    .bind(fecha)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(reservas) => reservas,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    HttpResponse::Ok().json(serde_json::json!({
        "fecha": fecha,
        "habitaciones": room_status_on(fecha, &rooms, &reservas),
    }))
}
