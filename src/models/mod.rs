pub mod habitacion;
pub mod reserva;
