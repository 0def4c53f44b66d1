use chrono::NaiveDate;

use crate::models::habitacion::Habitacion;
use crate::models::reserva::Reserva;

use super::{room_number_key, DomainError};

/// Solapamiento de dos intervalos semiabiertos `[a1, b1)` y `[a2, b2)`.
/// Egresar e ingresar el mismo día no se solapa.
pub fn overlaps(a1: NaiveDate, b1: NaiveDate, a2: NaiveDate, b2: NaiveDate) -> bool {
    a1 < b2 && a2 < b1
}

/// Habitaciones sin ninguna reserva que se solape con `[check_in, check_out)`,
/// ordenadas por número.
///
/// `min_persons` filtra además por capacidad de la clase. `exclude_reserva`
/// saca del chequeo las filas de esa reserva, para que al editarla la
/// habitación no choque consigo misma.
pub fn find_available_rooms(
    check_in: NaiveDate,
    check_out: NaiveDate,
    min_persons: Option<i64>,
    rooms: &[Habitacion],
    reservas: &[Reserva],
    exclude_reserva: Option<i64>,
) -> Result<Vec<Habitacion>, DomainError> {
    if check_in >= check_out {
        return Err(DomainError::InvalidRange);
    }

    let mut libres: Vec<Habitacion> = rooms
        .iter()
        .filter(|h| min_persons.is_none_or(|p| h.tipo.capacidad() >= p))
        .filter(|h| {
            !reservas.iter().any(|r| {
                r.habitacion_id == h.id
                    && exclude_reserva != Some(r.id)
                    && overlaps(r.fecha_ingreso, r.fecha_egreso, check_in, check_out)
            })
        })
        .cloned()
        .collect();

    libres.sort_by(|a, b| room_number_key(&a.numero).cmp(&room_number_key(&b.numero)));
    Ok(libres)
}
