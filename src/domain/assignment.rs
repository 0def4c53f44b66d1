use serde::{Deserialize, Serialize};

use crate::models::habitacion::Habitacion;

use super::{room_number_key, DomainError};

/// Un sub-pedido: cuántas personas van en una de las habitaciones.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pedido {
    pub personas: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Asignacion {
    pub habitacion: Habitacion,
    pub personas: i64,
}

/// Asigna a cada pedido, en orden, una habitación distinta del pool cuya
/// clase de capacidad sea la menor que alcance para sus personas; a igual
/// clase gana el número más bajo. Así las habitaciones grandes no se gastan
/// en grupos chicos.
///
/// Todo o nada: el primer pedido sin habitación posible corta el plan con
/// `InsufficientCapacity` y su índice.
pub fn plan_assignment(
    pedidos: &[Pedido],
    disponibles: &[Habitacion],
) -> Result<Vec<Asignacion>, DomainError> {
    let mut pool: Vec<&Habitacion> = disponibles.iter().collect();
    let mut plan = Vec::with_capacity(pedidos.len());

    for (index, pedido) in pedidos.iter().enumerate() {
        let elegida = pool
            .iter()
            .enumerate()
            .filter(|(_, h)| h.tipo.capacidad() >= pedido.personas)
            .min_by_key(|(_, h)| (h.tipo, room_number_key(&h.numero)))
            .map(|(i, _)| i);

        match elegida {
            Some(i) => {
                let habitacion = pool.remove(i).clone();
                plan.push(Asignacion {
                    habitacion,
                    personas: pedido.personas,
                });
            }
            None => return Err(DomainError::InsufficientCapacity { index }),
        }
    }

    Ok(plan)
}
