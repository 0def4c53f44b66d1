use serde::{Deserialize, Serialize};
use validator::Validate;

/// Clases de capacidad, ordenadas de menor a mayor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TipoHabitacion {
    Individual,
    Doble,
    Triple,
    Cuadruple,
    Quintuple,
}

impl TipoHabitacion {
    /// Máximo de personas que admite la clase: hasta 2 en individual o
    /// doble, 3 en triple, 4 en cuádruple y 5 en quíntuple.
    pub fn capacidad(self) -> i64 {
        match self {
            TipoHabitacion::Individual | TipoHabitacion::Doble => 2,
            TipoHabitacion::Triple => 3,
            TipoHabitacion::Cuadruple => 4,
            TipoHabitacion::Quintuple => 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Habitacion {
    pub id: i64,
    pub numero: String,
    pub tipo: TipoHabitacion,
    pub piso: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHabitacion {
    #[validate(length(min = 1))]
    pub numero: String,
    pub tipo: TipoHabitacion,
    #[validate(length(min = 1))]
    pub piso: String,
}
