use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::reserva::Reserva;

/// Indicadores de un rango de fechas, ambos extremos incluidos.
/// Se calculan a pedido y nunca se guardan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSnapshot {
    pub ingresos_totales: f64,
    pub noches_vendidas: i64,
    pub ocupacion: f64,
    pub adr: f64,
    pub revpar: f64,
    pub num_dias: i64,
    pub habitaciones_disponibles_noches: i64,
}

/// Noches vendidas, ingresos, ocupación, ADR y RevPAR del rango
/// `[range_start, range_end]`.
///
/// Cada fila de reserva aporta sus noches dentro del rango y la parte
/// proporcional de su monto, repartido parejo entre las noches de la
/// estadía completa. Una estadía de cero noches no aporta nada.
pub fn compute_kpis(
    range_start: NaiveDate,
    range_end: NaiveDate,
    reservas: &[Reserva],
    total_rooms: i64,
) -> KpiSnapshot {
    let num_dias = ((range_end - range_start).num_days() + 1).max(1);
    let limite = range_end + Duration::days(1);

    let mut noches_vendidas = 0i64;
    let mut ingresos_totales = 0f64;
    for r in reservas {
        let desde = r.fecha_ingreso.max(range_start);
        let hasta = r.fecha_egreso.min(limite);
        let noches = (hasta - desde).num_days().max(0);
        if noches == 0 {
            continue;
        }
        noches_vendidas += noches;

        let noches_reserva = (r.fecha_egreso - r.fecha_ingreso).num_days();
        let por_noche = if noches_reserva > 0 {
            r.monto_total / noches_reserva as f64
        } else {
            0.0
        };
        ingresos_totales += por_noche * noches as f64;
    }

    let habitaciones_disponibles_noches = total_rooms * num_dias;
    let ocupacion = if habitaciones_disponibles_noches > 0 {
        noches_vendidas as f64 / habitaciones_disponibles_noches as f64
    } else {
        0.0
    };
    let adr = if noches_vendidas > 0 {
        ingresos_totales / noches_vendidas as f64
    } else {
        0.0
    };
    let revpar = if habitaciones_disponibles_noches > 0 {
        ingresos_totales / habitaciones_disponibles_noches as f64
    } else {
        0.0
    };

    KpiSnapshot {
        ingresos_totales,
        noches_vendidas,
        ocupacion,
        adr,
        revpar,
        num_dias,
        habitaciones_disponibles_noches,
    }
}

/// Rango de igual largo inmediatamente anterior a `start`, para comparar
/// un período con el previo.
pub fn previous_period(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let largo = ((end - start).num_days() + 1).max(1);
    (start - Duration::days(largo), start - Duration::days(1))
}

/// Variación porcentual entre dos valores de un indicador.
pub fn pct_change(curr: f64, prev: f64) -> f64 {
    if prev == 0.0 {
        if curr > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (curr - prev) / prev * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reserva::Origen;

    fn fecha(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn reserva(habitacion_id: i64, ingreso: &str, egreso: &str, monto_total: f64) -> Reserva {
        let fecha_ingreso = fecha(ingreso);
        let fecha_egreso = fecha(egreso);
        let noches = (fecha_egreso - fecha_ingreso).num_days();
        Reserva {
            id: habitacion_id,
            encargado: "ana".to_string(),
            habitacion_id,
            nombre: "Juan".to_string(),
            apellido: "Pérez".to_string(),
            telefono: "1155550000".to_string(),
            personas: 2,
            fecha_ingreso,
            fecha_egreso,
            noches,
            precio_por_noche: if noches > 0 {
                monto_total / noches as f64
            } else {
                0.0
            },
            monto_total,
            senia: 0.0,
            resto: monto_total,
            cantidad_habitaciones: 1,
            celiacos: false,
            observaciones: String::new(),
            origen: Origen::Booking,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn prorratea_una_estadia_de_dos_noches_a_un_dia() {
        // Dos noches a $200 en total; el rango de un día toma una noche
        // y la mitad del monto.
        let reservas = vec![reserva(1, "2025-01-01", "2025-01-03", 200.0)];

        let kpis = compute_kpis(fecha("2025-01-01"), fecha("2025-01-01"), &reservas, 1);
        assert_eq!(kpis.noches_vendidas, 1);
        assert!(approx(kpis.ingresos_totales, 100.0));
        assert!(approx(kpis.ocupacion, 1.0));
        assert!(approx(kpis.adr, 100.0));
        assert!(approx(kpis.revpar, 100.0));
        assert_eq!(kpis.num_dias, 1);
        assert_eq!(kpis.habitaciones_disponibles_noches, 1);
    }

    #[test]
    fn una_noche_justa_en_el_borde_del_rango() {
        let reservas = vec![reserva(1, "2025-02-01", "2025-02-02", 150.0)];

        let kpis = compute_kpis(fecha("2025-02-01"), fecha("2025-02-28"), &reservas, 10);
        assert_eq!(kpis.noches_vendidas, 1);
        assert!(approx(kpis.ingresos_totales, 150.0));
    }

    #[test]
    fn fuera_del_rango_no_aporta() {
        let reservas = vec![reserva(1, "2025-03-10", "2025-03-12", 500.0)];

        let kpis = compute_kpis(fecha("2025-01-01"), fecha("2025-01-31"), &reservas, 5);
        assert_eq!(kpis.noches_vendidas, 0);
        assert!(approx(kpis.ingresos_totales, 0.0));
        assert!(approx(kpis.adr, 0.0));
    }

    #[test]
    fn los_subrangos_de_una_particion_suman_lo_mismo() {
        let reservas = vec![
            reserva(1, "2025-01-03", "2025-01-08", 500.0),
            reserva(2, "2025-01-09", "2025-01-12", 330.0),
            reserva(3, "2024-12-30", "2025-01-02", 400.0),
        ];

        let total = compute_kpis(fecha("2025-01-01"), fecha("2025-01-10"), &reservas, 4);
        let primera = compute_kpis(fecha("2025-01-01"), fecha("2025-01-04"), &reservas, 4);
        let segunda = compute_kpis(fecha("2025-01-05"), fecha("2025-01-07"), &reservas, 4);
        let tercera = compute_kpis(fecha("2025-01-08"), fecha("2025-01-10"), &reservas, 4);

        assert_eq!(
            total.noches_vendidas,
            primera.noches_vendidas + segunda.noches_vendidas + tercera.noches_vendidas
        );
        assert!(approx(
            total.ingresos_totales,
            primera.ingresos_totales + segunda.ingresos_totales + tercera.ingresos_totales
        ));
    }

    #[test]
    fn estadia_de_cero_noches_no_divide_por_cero() {
        let reservas = vec![reserva(1, "2025-01-05", "2025-01-05", 100.0)];

        let kpis = compute_kpis(fecha("2025-01-01"), fecha("2025-01-31"), &reservas, 3);
        assert_eq!(kpis.noches_vendidas, 0);
        assert!(approx(kpis.ingresos_totales, 0.0));
    }

    #[test]
    fn sin_habitaciones_no_hay_nan() {
        let kpis = compute_kpis(fecha("2025-01-01"), fecha("2025-01-31"), &[], 0);
        assert!(approx(kpis.ocupacion, 0.0));
        assert!(approx(kpis.revpar, 0.0));
        assert_eq!(kpis.habitaciones_disponibles_noches, 0);
    }

    #[test]
    fn periodo_anterior_del_mismo_largo() {
        let (desde, hasta) = previous_period(fecha("2025-01-11"), fecha("2025-01-20"));
        assert_eq!(desde, fecha("2025-01-01"));
        assert_eq!(hasta, fecha("2025-01-10"));
    }

    #[test]
    fn variacion_porcentual() {
        assert!(approx(pct_change(150.0, 100.0), 50.0));
        assert!(approx(pct_change(50.0, 100.0), -50.0));
        assert!(approx(pct_change(10.0, 0.0), 100.0));
        assert!(approx(pct_change(0.0, 0.0), 0.0));
    }
}
