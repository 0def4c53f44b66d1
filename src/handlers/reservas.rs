use std::collections::{HashMap, HashSet};

use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::domain::assignment::{plan_assignment, Pedido};
use crate::domain::availability::find_available_rooms;
use crate::domain::occupancy::cleaning_board;
use crate::domain::DomainError;
use crate::models::habitacion::Habitacion;
use crate::models::reserva::{
    CreateReserva, PedidoHabitacion, Reserva, ReservaConHabitacion, UpdateReserva,
};

use super::{domain_error_response, ErrorResponse};

/// Medialunas por huésped que encarga la cocina para el desayuno.
const MEDIALUNAS_POR_PERSONA: f64 = 2.5;

fn hoy() -> NaiveDate {
    chrono::Local::now().date_naive()
}

async fn con_habitaciones(
    pool: &SqlitePool,
    reservas: Vec<Reserva>,
) -> Result<Vec<ReservaConHabitacion>, sqlx::Error> {
    let habitaciones = sqlx::query_as::<_, Habitacion>("SELECT * FROM habitaciones")
        .fetch_all(pool)
        .await?;
    let por_id: HashMap<i64, Habitacion> =
        habitaciones.into_iter().map(|h| (h.id, h)).collect();

    Ok(reservas
        .into_iter()
        .map(|reserva| ReservaConHabitacion {
            habitacion: por_id.get(&reserva.habitacion_id).cloned(),
            reserva,
        })
        .collect())
}

pub async fn get_reservas(pool: web::Data<SqlitePool>) -> impl Responder {
    let reservas = match sqlx::query_as::<_, Reserva>("SELECT * FROM reservas ORDER BY id DESC")
        .fetch_all(pool.get_ref())
        .await
    {
        Ok(reservas) => reservas,
        Err(e) => {
            log::error!("error listando reservas: {e}");
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"));
        }
    };

    match con_habitaciones(pool.get_ref(), reservas).await {
        Ok(lista) => HttpResponse::Ok().json(lista),
        Err(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

pub async fn get_reserva_by_id(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> impl Responder {
    let id = path.into_inner();

    let reserva = match sqlx::query_as::<_, Reserva>("SELECT * FROM reservas WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some(reserva)) => reserva,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("Reserva no encontrada"))
        }
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    match con_habitaciones(pool.get_ref(), vec![reserva]).await {
        Ok(mut lista) => HttpResponse::Ok().json(lista.remove(0)),
        Err(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

pub async fn create_reserva(
    pool: web::Data<SqlitePool>,
    body: web::Json<CreateReserva>,
) -> impl Responder {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(e);
    }

    if body.fecha_ingreso >= body.fecha_egreso {
        return domain_error_response(&DomainError::InvalidRange);
    }

    // Normalizar al formato de varias habitaciones; el formato de una sola
    // es un pedido único con la habitación ya elegida.
    let pedidos: Vec<PedidoHabitacion> = match (&body.habitaciones, body.habitacion_id) {
        (Some(lista), _) if !lista.is_empty() => lista.clone(),
        (_, Some(habitacion_id)) => vec![PedidoHabitacion {
            habitacion_id: Some(habitacion_id),
            personas: body.personas.unwrap_or(1),
        }],
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "Se requiere habitacion_id o una lista de habitaciones",
            ))
        }
    };

    if pedidos.iter().any(|p| p.personas < 1) {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("Cada pedido necesita al menos 1 persona"));
    }

    let elegidas: Vec<i64> = pedidos.iter().filter_map(|p| p.habitacion_id).collect();
    let mut vistas = HashSet::new();
    if let Some(repetida) = elegidas.iter().find(|id| !vistas.insert(**id)) {
        return HttpResponse::BadRequest().json(ErrorResponse::new(format!(
            "La habitación {repetida} aparece más de una vez en el pedido"
        )));
    }

    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("No se pudo iniciar la transacción"))
        }
    };

    // Instantánea dentro de la transacción: habitaciones y reservas que
    // tocan el rango pedido.
    let rooms = match sqlx::query_as::<_, Habitacion>("SELECT * FROM habitaciones")
        .fetch_all(&mut *tx)
        .await
    {
        Ok(rooms) => rooms,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    let en_rango = match sqlx::query_as::<_, Reserva>(
        "SELECT * FROM reservas WHERE fecha_ingreso < ? AND fecha_egreso > ?",
    )
    .bind(body.fecha_egreso)
    .bind(body.fecha_ingreso)
    .fetch_all(&mut *tx)
    .await
    {
        Ok(reservas) => reservas,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    // Para los pedidos sin habitación elegida decide el planificador,
    // sobre las libres que no fueron pedidas a mano.
    let libres = match find_available_rooms(
        body.fecha_ingreso,
        body.fecha_egreso,
        None,
        &rooms,
        &en_rango,
        None,
    ) {
        Ok(libres) => libres,
        Err(err) => return domain_error_response(&err),
    };
    let pool_auto: Vec<Habitacion> = libres
        .into_iter()
        .filter(|h| !elegidas.contains(&h.id))
        .collect();

    let auto_indices: Vec<usize> = pedidos
        .iter()
        .enumerate()
        .filter(|(_, p)| p.habitacion_id.is_none())
        .map(|(i, _)| i)
        .collect();
    let auto_pedidos: Vec<Pedido> = auto_indices
        .iter()
        .map(|&i| Pedido {
            personas: pedidos[i].personas,
        })
        .collect();

    let mut plan = match plan_assignment(&auto_pedidos, &pool_auto) {
        Ok(plan) => plan.into_iter(),
        Err(DomainError::InsufficientCapacity { index }) => {
            return domain_error_response(&DomainError::InsufficientCapacity {
                index: auto_indices[index],
            })
        }
        Err(err) => return domain_error_response(&err),
    };

    // Pedido a pedido, en orden: la habitación elegida a mano o la que
    // asignó el planificador.
    let mut asignaciones: Vec<(Habitacion, i64)> = Vec::with_capacity(pedidos.len());
    for pedido in &pedidos {
        match pedido.habitacion_id {
            Some(id) => match rooms.iter().find(|h| h.id == id) {
                Some(habitacion) => asignaciones.push((habitacion.clone(), pedido.personas)),
                None => {
                    return HttpResponse::NotFound().json(ErrorResponse::new(format!(
                        "Habitación {id} no encontrada"
                    )))
                }
            },
            None => match plan.next() {
                Some(asignacion) => asignaciones.push((asignacion.habitacion, pedido.personas)),
                None => {
                    return HttpResponse::InternalServerError()
                        .json(ErrorResponse::new("Error armando el plan de asignación"))
                }
            },
        }
    }

    // Re-chequeo de solapamiento por habitación dentro de la transacción:
    // si otra reserva ganó la carrera, toda la operación se rechaza.
    for (habitacion, _) in &asignaciones {
        let conflictos: i64 = match sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM reservas
            WHERE habitacion_id = ?
            AND fecha_ingreso < ?
            AND fecha_egreso > ?
            "#,
        )
        .bind(habitacion.id)
        .bind(body.fecha_egreso)
        .bind(body.fecha_ingreso)
        .fetch_one(&mut *tx)
        .await
        {
            Ok(conflictos) => conflictos,
            Err(_) => {
                return HttpResponse::InternalServerError()
                    .json(ErrorResponse::new("No se pudo verificar disponibilidad"))
            }
        };

        if conflictos > 0 {
            return domain_error_response(&DomainError::DoubleBooking {
                numero: habitacion.numero.clone(),
            });
        }
    }

    let noches = (body.fecha_egreso - body.fecha_ingreso).num_days();
    let precio_por_noche = if noches > 0 {
        body.monto_total / noches as f64
    } else {
        0.0
    };
    let resto = body.monto_total - body.senia;
    let cantidad_habitaciones = asignaciones.len() as i64;

    let mut creadas = Vec::with_capacity(asignaciones.len());
    for (habitacion, personas) in &asignaciones {
        let creada = match sqlx::query_as::<_, Reserva>(
            r#"
            INSERT INTO reservas (
                encargado, habitacion_id, nombre, apellido, telefono, personas,
                fecha_ingreso, fecha_egreso, noches, precio_por_noche,
                monto_total, senia, resto, cantidad_habitaciones,
                celiacos, observaciones, origen
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&body.encargado)
        .bind(habitacion.id)
        .bind(&body.nombre)
        .bind(&body.apellido)
        .bind(&body.telefono)
        .bind(personas)
        .bind(body.fecha_ingreso)
        .bind(body.fecha_egreso)
        .bind(noches)
        .bind(precio_por_noche)
        .bind(body.monto_total)
        .bind(body.senia)
        .bind(resto)
        .bind(cantidad_habitaciones)
        .bind(body.celiacos)
        .bind(&body.observaciones)
        .bind(body.origen)
        .fetch_one(&mut *tx)
        .await
        {
            Ok(creada) => creada,
            Err(e) => {
                log::error!("error insertando reserva: {e}");
                return HttpResponse::InternalServerError()
                    .json(ErrorResponse::new("No se pudo crear la reserva"));
            }
        };
        creadas.push(ReservaConHabitacion {
            habitacion: Some(habitacion.clone()),
            reserva: creada,
        });
    }

    if tx.commit().await.is_err() {
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::new("No se pudo confirmar la transacción"));
    }

    if creadas.len() == 1 {
        HttpResponse::Created().json(creadas.remove(0))
    } else {
        HttpResponse::Created().json(creadas)
    }
}

pub async fn update_reserva(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<UpdateReserva>,
) -> impl Responder {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(e);
    }
    if body.fecha_ingreso >= body.fecha_egreso {
        return domain_error_response(&DomainError::InvalidRange);
    }
    let id = path.into_inner();

    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("No se pudo iniciar la transacción"))
        }
    };

    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservas WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await
    {
        Ok(0) => return HttpResponse::NotFound().json(ErrorResponse::new("Reserva no encontrada")),
        Ok(_) => {}
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    }

    let habitacion = match sqlx::query_as::<_, Habitacion>(
        "SELECT * FROM habitaciones WHERE id = ?",
    )
    .bind(body.habitacion_id)
    .fetch_optional(&mut *tx)
    .await
    {
        Ok(Some(habitacion)) => habitacion,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("Habitación no encontrada"))
        }
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    // El chequeo de solapamiento deja afuera la propia reserva: sin esto
    // cualquier edición chocaría consigo misma.
    let conflictos: i64 = match sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM reservas
        WHERE habitacion_id = ?
        AND id != ?
        AND fecha_ingreso < ?
        AND fecha_egreso > ?
        "#,
    )
    .bind(body.habitacion_id)
    .bind(id)
    .bind(body.fecha_egreso)
    .bind(body.fecha_ingreso)
    .fetch_one(&mut *tx)
    .await
    {
        Ok(conflictos) => conflictos,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("No se pudo verificar disponibilidad"))
        }
    };

    if conflictos > 0 {
        return domain_error_response(&DomainError::DoubleBooking {
            numero: habitacion.numero.clone(),
        });
    }

    let noches = (body.fecha_egreso - body.fecha_ingreso).num_days();
    let precio_por_noche = if noches > 0 {
        body.monto_total / noches as f64
    } else {
        0.0
    };
    let resto = body.monto_total - body.senia;

    let actualizada = match sqlx::query_as::<_, Reserva>(
        r#"
        UPDATE reservas SET
            encargado = ?, habitacion_id = ?, nombre = ?, apellido = ?,
            telefono = ?, personas = ?, fecha_ingreso = ?, fecha_egreso = ?,
            noches = ?, precio_por_noche = ?, monto_total = ?, senia = ?,
            resto = ?, cantidad_habitaciones = ?, celiacos = ?,
            observaciones = ?, origen = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&body.encargado)
    .bind(body.habitacion_id)
    .bind(&body.nombre)
    .bind(&body.apellido)
    .bind(&body.telefono)
    .bind(body.personas)
    .bind(body.fecha_ingreso)
    .bind(body.fecha_egreso)
    .bind(noches)
    .bind(precio_por_noche)
    .bind(body.monto_total)
    .bind(body.senia)
    .bind(resto)
    .bind(body.cantidad_habitaciones)
    .bind(body.celiacos)
    .bind(&body.observaciones)
    .bind(body.origen)
    .bind(id)
    .fetch_one(&mut *tx)
    .await
    {
        Ok(actualizada) => actualizada,
        Err(e) => {
            log::error!("error actualizando reserva {id}: {e}");
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("No se pudo actualizar la reserva"));
        }
    };

    if tx.commit().await.is_err() {
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::new("No se pudo confirmar la transacción"));
    }

    HttpResponse::Ok().json(ReservaConHabitacion {
        habitacion: Some(habitacion),
        reserva: actualizada,
    })
}

pub async fn delete_reserva(pool: web::Data<SqlitePool>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();

    match sqlx::query("DELETE FROM reservas WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
    {
        Ok(done) if done.rows_affected() > 0 => HttpResponse::Ok().json(serde_json::json!({
            "message": "Reserva cancelada",
            "id": id,
        })),
        Ok(_) => HttpResponse::NotFound().json(ErrorResponse::new("Reserva no encontrada")),
        Err(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

#[derive(Deserialize)]
pub struct PlanRequest {
    pub fecha_ingreso: NaiveDate,
    pub fecha_egreso: NaiveDate,
    pub pedidos: Vec<Pedido>,
}

/// Corrida en seco del planificador: qué habitaciones tocarían a cada
/// pedido, sin reservar nada.
pub async fn plan_reserva(
    pool: web::Data<SqlitePool>,
    body: web::Json<PlanRequest>,
) -> impl Responder {
    if body.pedidos.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Se requiere al menos un pedido"));
    }
    if body.pedidos.iter().any(|p| p.personas < 1) {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("Cada pedido necesita al menos 1 persona"));
    }

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
        "SELECT * FROM reservas WHERE fecha_ingreso < ? AND fecha_egreso > ?",
    )
    .bind(body.fecha_egreso)
    .bind(body.fecha_ingreso)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(reservas) => reservas,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    let libres = match find_available_rooms(
        body.fecha_ingreso,
        body.fecha_egreso,
        None,
        &rooms,
        &reservas,
        None,
    ) {
        Ok(libres) => libres,
        Err(err) => return domain_error_response(&err),
    };

    match plan_assignment(&body.pedidos, &libres) {
        Ok(plan) => HttpResponse::Ok().json(serde_json::json!({
            "fecha_ingreso": body.fecha_ingreso,
            "fecha_egreso": body.fecha_egreso,
            "asignaciones": plan,
        })),
        Err(err) => domain_error_response(&err),
    }
}

pub async fn reservas_hoy(pool: web::Data<SqlitePool>) -> impl Responder {
    let fecha = hoy();
    let reservas = match sqlx::query_as::<_, Reserva>(
        "SELECT * FROM reservas WHERE fecha_ingreso = ? OR fecha_egreso = ?",
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

    match con_habitaciones(pool.get_ref(), reservas).await {
        Ok(lista) => HttpResponse::Ok().json(lista),
        Err(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

#[derive(Deserialize)]
pub struct FechaQuery {
    pub fecha: Option<NaiveDate>,
}

pub async fn checkins(
    pool: web::Data<SqlitePool>,
    params: web::Query<FechaQuery>,
) -> impl Responder {
    let fecha = params.fecha.unwrap_or_else(hoy);
    let reservas = match sqlx::query_as::<_, Reserva>(
        "SELECT * FROM reservas WHERE fecha_ingreso = ?",
    )
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

    match con_habitaciones(pool.get_ref(), reservas).await {
        Ok(lista) => HttpResponse::Ok().json(lista),
        Err(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

pub async fn checkouts(
    pool: web::Data<SqlitePool>,
    params: web::Query<FechaQuery>,
) -> impl Responder {
    let fecha = params.fecha.unwrap_or_else(hoy);
    let reservas = match sqlx::query_as::<_, Reserva>(
        "SELECT * FROM reservas WHERE fecha_egreso = ?",
    )
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

    match con_habitaciones(pool.get_ref(), reservas).await {
        Ok(lista) => HttpResponse::Ok().json(lista),
        Err(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse::new("Error de base de datos"))
        }
    }
}

/// Reservas alojadas en una fecha, más el encargo de medialunas para el
/// desayuno del día siguiente.
pub async fn por_fecha(
    pool: web::Data<SqlitePool>,
    params: web::Query<FechaQuery>,
) -> impl Responder {
    let fecha = params.fecha.unwrap_or_else(hoy);

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

    let total_personas: i64 = reservas.iter().map(|r| r.personas).sum();
    let medialunas = total_personas as f64 * MEDIALUNAS_POR_PERSONA;
    let docenas = (medialunas / 12.0 * 10.0).round() / 10.0;

    let lista = match con_habitaciones(pool.get_ref(), reservas).await {
        Ok(lista) => lista,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error de base de datos"))
        }
    };

    HttpResponse::Ok().json(serde_json::json!({
        "reservas": lista,
        "total_personas_actual": total_personas,
        "medialunas": {
            "fecha_siguiente": fecha + chrono::Duration::days(1),
            "total_personas": total_personas,
            "docenas_necesarias": docenas,
            "medialunas_totales": medialunas.round(),
        },
    }))
}

/// Tablero de limpieza del día para la gobernanta.
pub async fn limpieza(
    pool: web::Data<SqlitePool>,
    params: web::Query<FechaQuery>,
) -> impl Responder {
    let fecha = params.fecha.unwrap_or_else(hoy);

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

    // Alcanza con las reservas activas en la fecha o que egresan ese día.
    let reservas = match sqlx::query_as::<_, Reserva>(
        "SELECT * FROM reservas WHERE fecha_ingreso <= ? AND fecha_egreso >= ?",
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

    let tablero = cleaning_board(fecha, &rooms, &reservas);
    HttpResponse::Ok().json(serde_json::json!({
        "fecha": fecha,
        "a_limpiar": tablero.a_limpiar,
        "a_pasajero": tablero.a_pasajero,
        "a_limpiar_pasajero": tablero.a_limpiar_pasajero,
    }))
}
