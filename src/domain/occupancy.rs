use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::habitacion::{Habitacion, TipoHabitacion};
use crate::models::reserva::Reserva;

use super::room_number_key;

/// Días que cubre la grilla de planning.
pub const PLANNING_DAYS: i64 = 60;

/// Noche de estadía (contando desde 1) a partir de la cual el repaso pasa
/// a ser limpieza completa con pasajero adentro.
const NOCHE_LIMPIEZA_PROFUNDA: i64 = 4;

/// La fila ocupa la habitación la noche de `fecha`.
pub fn occupied_on(r: &Reserva, fecha: NaiveDate) -> bool {
    r.fecha_ingreso <= fecha && fecha < r.fecha_egreso
}

#[derive(Debug, Serialize)]
pub struct EstadoHabitacion {
    pub id: i64,
    pub numero: String,
    pub tipo: TipoHabitacion,
    pub piso: String,
    pub ocupada: bool,
}

/// Estado ocupada/libre de cada habitación para un día puntual.
pub fn room_status_on(
    fecha: NaiveDate,
    rooms: &[Habitacion],
    reservas: &[Reserva],
) -> Vec<EstadoHabitacion> {
    rooms
        .iter()
        .map(|h| EstadoHabitacion {
            id: h.id,
            numero: h.numero.clone(),
            tipo: h.tipo,
            piso: h.piso.clone(),
            ocupada: reservas
                .iter()
                .any(|r| r.habitacion_id == h.id && occupied_on(r, fecha)),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct TareaLimpieza {
    pub id: i64,
    pub numero: String,
    pub tipo: TipoHabitacion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noches_estadia: Option<i64>,
}

/// Tablero del día para la gobernanta.
#[derive(Debug, Default, Serialize)]
pub struct TableroLimpieza {
    /// Se fueron los pasajeros: limpieza completa.
    pub a_limpiar: Vec<TareaLimpieza>,
    /// Pasajero adentro: repaso de rutina.
    pub a_pasajero: Vec<TareaLimpieza>,
    /// Cuarta noche o más y sigue al menos una noche: limpieza completa
    /// con el pasajero alojado.
    pub a_limpiar_pasajero: Vec<TareaLimpieza>,
}

pub fn cleaning_board(
    fecha: NaiveDate,
    rooms: &[Habitacion],
    reservas: &[Reserva],
) -> TableroLimpieza {
    let mut tablero = TableroLimpieza::default();

    for h in rooms {
        let activa = reservas
            .iter()
            .find(|r| r.habitacion_id == h.id && occupied_on(r, fecha));

        if let Some(r) = activa {
            // Noches cumplidas hasta hoy, contando la de esta noche.
            let noches_estadia = (fecha - r.fecha_ingreso).num_days() + 1;
            let tarea = TareaLimpieza {
                id: h.id,
                numero: h.numero.clone(),
                tipo: h.tipo,
                noches_estadia: Some(noches_estadia),
            };
            if noches_estadia >= NOCHE_LIMPIEZA_PROFUNDA
                && r.fecha_egreso > fecha + Duration::days(1)
            {
                tablero.a_limpiar_pasajero.push(tarea);
            } else {
                tablero.a_pasajero.push(tarea);
            }
        } else if reservas
            .iter()
            .any(|r| r.habitacion_id == h.id && r.fecha_egreso == fecha)
        {
            tablero.a_limpiar.push(TareaLimpieza {
                id: h.id,
                numero: h.numero.clone(),
                tipo: h.tipo,
                noches_estadia: None,
            });
        }
    }

    tablero
}

#[derive(Debug, Serialize)]
pub struct CeldaPlanning {
    pub is_occupied: bool,
    pub is_last_night: bool,
    pub nombre: Option<String>,
    pub reserva_id: Option<i64>,
    pub fecha_ingreso: Option<NaiveDate>,
    pub fecha_egreso: Option<NaiveDate>,
}

impl CeldaPlanning {
    fn libre() -> Self {
        CeldaPlanning {
            is_occupied: false,
            is_last_night: false,
            nombre: None,
            reserva_id: None,
            fecha_ingreso: None,
            fecha_egreso: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilaPlanning {
    pub habitacion: Habitacion,
    pub ocupaciones: Vec<CeldaPlanning>,
}

/// Grilla de ocupación de `PLANNING_DAYS` días desde `first_day`, una fila
/// por habitación ordenadas por clase y número. El nombre del huésped va
/// solo en la celda del día de ingreso; `is_last_night` marca la víspera
/// del egreso.
pub fn planning_grid(
    first_day: NaiveDate,
    rooms: &[Habitacion],
    reservas: &[Reserva],
) -> (Vec<NaiveDate>, Vec<FilaPlanning>) {
    let days: Vec<NaiveDate> = (0..PLANNING_DAYS)
        .map(|i| first_day + Duration::days(i))
        .collect();

    let mut ordenadas: Vec<&Habitacion> = rooms.iter().collect();
    ordenadas.sort_by(|a, b| {
        (a.tipo, room_number_key(&a.numero)).cmp(&(b.tipo, room_number_key(&b.numero)))
    });

    let filas = ordenadas
        .into_iter()
        .map(|h| {
            let de_la_habitacion: Vec<&Reserva> = reservas
                .iter()
                .filter(|r| r.habitacion_id == h.id)
                .collect();
            let mut nombre_mostrado: HashSet<i64> = HashSet::new();

            let ocupaciones = days
                .iter()
                .map(|&day| {
                    de_la_habitacion
                        .iter()
                        .find(|r| occupied_on(r, day))
                        .map(|r| CeldaPlanning {
                            is_occupied: true,
                            is_last_night: day == r.fecha_egreso - Duration::days(1),
                            nombre: if day == r.fecha_ingreso && nombre_mostrado.insert(r.id) {
                                Some(r.nombre.clone())
                            } else {
                                None
                            },
                            reserva_id: Some(r.id),
                            fecha_ingreso: Some(r.fecha_ingreso),
                            fecha_egreso: Some(r.fecha_egreso),
                        })
                        .unwrap_or_else(CeldaPlanning::libre)
                })
                .collect();

            FilaPlanning {
                habitacion: h.clone(),
                ocupaciones,
            }
        })
        .collect();

    (days, filas)
}
