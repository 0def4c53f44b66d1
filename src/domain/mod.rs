//! Lógica de disponibilidad, asignación y estadísticas de ocupación.
//!
//! Todo este módulo trabaja sobre instantáneas de habitaciones y reservas
//! que recibe por argumento; no toca la base de datos. La atomicidad entre
//! "consultar disponibilidad" e "insertar la reserva" la aporta la
//! transacción del caller.

pub mod assignment;
pub mod availability;
pub mod kpi;
pub mod occupancy;

use thiserror::Error;

/// Motivos de rechazo de una operación de reserva.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("la fecha de ingreso debe ser anterior a la fecha de egreso")]
    InvalidRange,
    #[error("ninguna habitación libre alcanza para el pedido {index}")]
    InsufficientCapacity { index: usize },
    #[error("la habitación {numero} ya está reservada en esas fechas")]
    DoubleBooking { numero: String },
}

/// Clave de orden para números de habitación: numérica cuando el rótulo es
/// un número, lexicográfica como respaldo.
pub(crate) fn room_number_key(numero: &str) -> (u8, u64, String) {
    match numero.parse::<u64>() {
        Ok(n) => (0, n, String::new()),
        Err(_) => (1, 0, numero.to_string()),
    }
}
