use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::domain::kpi::{compute_kpis, pct_change, previous_period};
use crate::domain::DomainError;
use crate::models::reserva::Reserva;

use super::{domain_error_response, ErrorResponse};

/// Resumen general para el mostrador: totales, ocupación de hoy e ingresos
/// históricos.
pub async fn resumen(pool: web::Data<SqlitePool>) -> impl Responder {
    let hoy = chrono::Local::now().date_naive();

    let totales: Result<(i64, i64, f64, i64, i64, i64), sqlx::Error> = async {
        let total_reservas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservas")
            .fetch_one(pool.get_ref())
            .await?;
        let total_habitaciones: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM habitaciones")
            .fetch_one(pool.get_ref())
            .await?;
        let ingresos_totales: f64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(monto_total), 0) FROM reservas")
                .fetch_one(pool.get_ref())
                .await?;
        let reservas_hoy: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservas WHERE fecha_ingreso = ?")
                .bind(hoy)
                .fetch_one(pool.get_ref())
                .await?;
        let checkouts_hoy: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservas WHERE fecha_egreso = ?")
                .bind(hoy)
                .fetch_one(pool.get_ref())
                .await?;
        let habitaciones_ocupadas: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT habitacion_id) FROM reservas
            WHERE fecha_ingreso <= ? AND fecha_egreso > ?
            "#,
        )
        .bind(hoy)
        .bind(hoy)
        .fetch_one(pool.get_ref())
        .await?;

        Ok((
            total_reservas,
            total_habitaciones,
            ingresos_totales,
            reservas_hoy,
            checkouts_hoy,
            habitaciones_ocupadas,
        ))
    }
    .await;

    match totales {
        Ok((
            total_reservas,
            total_habitaciones,
            ingresos_totales,
            reservas_hoy,
            checkouts_hoy,
            habitaciones_ocupadas,
        )) => HttpResponse::Ok().json(serde_json::json!({
            "total_reservas": total_reservas,
            "total_habitaciones": total_habitaciones,
            "habitaciones_ocupadas": habitaciones_ocupadas,
            "habitaciones_disponibles": total_habitaciones - habitaciones_ocupadas,
            "ingresos_totales": ingresos_totales,
            "reservas_hoy": reservas_hoy,
            "checkouts_hoy": checkouts_hoy,
        })),
        Err(e) => {
            log::error!("error armando el resumen: {e}");
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

#[derive(Deserialize)]
pub struct KpiQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

async fn reservas_entre(
    pool: &SqlitePool,
    desde: NaiveDate,
    hasta: NaiveDate,
) -> Result<Vec<Reserva>, sqlx::Error> {
    // El rango de KPIs incluye ambos extremos; entran las filas con alguna
    // noche dentro de él.
    sqlx::query_as::<_, Reserva>(
        "SELECT * FROM reservas WHERE fecha_ingreso <= ? AND fecha_egreso > ?",
    )
    .bind(hasta)
    .bind(desde)
    .fetch_all(pool)
    .await
}

/// Indicadores del rango `[start_date, end_date]`.
pub async fn kpis(pool: web::Data<SqlitePool>, params: web::Query<KpiQuery>) -> impl Responder {
    if params.end_date < params.start_date {
        return domain_error_response(&DomainError::InvalidRange);
    }

    let total_rooms: i64 = match sqlx::query_scalar("SELECT COUNT(*) FROM habitaciones")
        .fetch_one(pool.get_ref())
        .await
    {
        Ok(total) => total,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    let reservas = match reservas_entre(pool.get_ref(), params.start_date, params.end_date).await {
        Ok(reservas) => reservas,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    HttpResponse::Ok().json(compute_kpis(
        params.start_date,
        params.end_date,
        &reservas,
        total_rooms,
    ))
}

/// Indicadores del rango y del período de igual largo inmediatamente
/// anterior, con la variación porcentual de cada uno.
pub async fn kpis_comparacion(
    pool: web::Data<SqlitePool>,
    params: web::Query<KpiQuery>,
) -> impl Responder {
    if params.end_date < params.start_date {
        return domain_error_response(&DomainError::InvalidRange);
    }

    let total_rooms: i64 = match sqlx::query_scalar("SELECT COUNT(*) FROM habitaciones")
        .fetch_one(pool.get_ref())
        .await
    {
        Ok(total) => total,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    let (prev_start, prev_end) = previous_period(params.start_date, params.end_date);

    // Una sola consulta que cubre los dos períodos.
    let reservas = match reservas_entre(pool.get_ref(), prev_start, params.end_date).await {
        Ok(reservas) => reservas,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    let actual = compute_kpis(params.start_date, params.end_date, &reservas, total_rooms);
    let anterior = compute_kpis(prev_start, prev_end, &reservas, total_rooms);

    let variacion = serde_json::json!({
        "ingresos_totales": pct_change(actual.ingresos_totales, anterior.ingresos_totales),
        "noches_vendidas": pct_change(
            actual.noches_vendidas as f64,
            anterior.noches_vendidas as f64,
        ),
        "ocupacion": pct_change(actual.ocupacion, anterior.ocupacion),
        "adr": pct_change(actual.adr, anterior.adr),
        "revpar": pct_change(actual.revpar, anterior.revpar),
    });

    HttpResponse::Ok().json(serde_json::json!({
        "actual": actual,
        "anterior": anterior,
        "variacion": variacion,
    }))
}
