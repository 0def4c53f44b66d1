use serde::{Deserialize, Serialize};
use validator::Validate;

use super::habitacion::Habitacion;

/// Canal por el que entró la reserva.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Origen {
    Booking,
    #[serde(rename = "celular")]
    #[sqlx(rename = "celular")]
    Celular,
    #[serde(rename = "calle")]
    #[sqlx(rename = "calle")]
    Calle,
    #[serde(rename = "sindicato")]
    #[sqlx(rename = "sindicato")]
    Sindicato,
    #[serde(rename = "agencia")]
    #[sqlx(rename = "agencia")]
    Agencia,
}

/// Una fila de reserva ocupa una habitación física. Una reserva lógica de
/// varias habitaciones se guarda como varias filas que comparten los datos
/// del huésped y llevan `cantidad_habitaciones` > 1.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reserva {
    pub id: i64,
    pub encargado: String,
    pub habitacion_id: i64,
    pub nombre: String,
    pub apellido: String,
    pub telefono: String,
    pub personas: i64,
    pub fecha_ingreso: chrono::NaiveDate,
    pub fecha_egreso: chrono::NaiveDate,
    pub noches: i64,
    pub precio_por_noche: f64,
    pub monto_total: f64,
    pub senia: f64,
    pub resto: f64,
    pub cantidad_habitaciones: i64,
    pub celiacos: bool,
    pub observaciones: String,
    pub origen: Origen,
}

/// Reserva con los datos de su habitación embebidos, para los listados.
#[derive(Debug, Serialize)]
pub struct ReservaConHabitacion {
    #[serde(flatten)]
    pub reserva: Reserva,
    pub habitacion: Option<Habitacion>,
}

/// Sub-pedido de una reserva de varias habitaciones. Sin `habitacion_id`
/// el servidor elige la habitación por sí mismo.
#[derive(Debug, Clone, Deserialize)]
pub struct PedidoHabitacion {
    pub habitacion_id: Option<i64>,
    pub personas: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReserva {
    #[validate(length(min = 1))]
    pub encargado: String,
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(length(min = 1))]
    pub apellido: String,
    #[validate(length(min = 1))]
    pub telefono: String,
    pub fecha_ingreso: chrono::NaiveDate,
    pub fecha_egreso: chrono::NaiveDate,
    pub habitacion_id: Option<i64>,
    pub personas: Option<i64>,
    pub habitaciones: Option<Vec<PedidoHabitacion>>,
    #[validate(range(min = 0.0))]
    pub monto_total: f64,
    #[validate(range(min = 0.0))]
    pub senia: f64,
    #[serde(default)]
    pub celiacos: bool,
    #[serde(default)]
    pub observaciones: String,
    pub origen: Origen,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReserva {
    #[validate(length(min = 1))]
    pub encargado: String,
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(length(min = 1))]
    pub apellido: String,
    #[validate(length(min = 1))]
    pub telefono: String,
    pub fecha_ingreso: chrono::NaiveDate,
    pub fecha_egreso: chrono::NaiveDate,
    pub habitacion_id: i64,
    #[validate(range(min = 1))]
    pub personas: i64,
    #[validate(range(min = 1))]
    pub cantidad_habitaciones: i64,
    #[validate(range(min = 0.0))]
    pub monto_total: f64,
    #[validate(range(min = 0.0))]
    pub senia: f64,
    #[serde(default)]
    pub celiacos: bool,
    #[serde(default)]
    pub observaciones: String,
    pub origen: Origen,
}
