use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use reservas_api::handlers;

async fn test_pool() -> SqlitePool {
    // Una sola conexión: cada conexión nueva a ":memory:" abriría otra base.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("pool de prueba");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migraciones");
    pool
}

macro_rules! app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .service(web::scope("/api").configure(handlers::config)),
        )
        .await
    };
}

macro_rules! crear_habitacion {
    ($app:expr, $numero:expr, $tipo:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/habitaciones")
            .set_json(json!({ "numero": $numero, "tipo": $tipo, "piso": "planta baja" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["id"].as_i64().expect("id de la habitación")
    }};
}

fn body_reserva(habitacion_id: i64, ingreso: &str, egreso: &str) -> Value {
    json!({
        "encargado": "ana",
        "nombre": "Juan",
        "apellido": "Pérez",
        "telefono": "1155550000",
        "fecha_ingreso": ingreso,
        "fecha_egreso": egreso,
        "habitacion_id": habitacion_id,
        "personas": 2,
        "monto_total": 200.0,
        "senia": 50.0,
        "origen": "celular"
    })
}

#[actix_web::test]
async fn reservar_y_consultar_disponibilidad() {
    let pool = test_pool().await;
    let app = app!(pool);

    let doble = crear_habitacion!(app, "1", "doble");
    crear_habitacion!(app, "2", "quintuple");

    let req = test::TestRequest::post()
        .uri("/api/reservas")
        .set_json(body_reserva(doble, "2025-01-01", "2025-01-03"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let creada: Value = test::read_body_json(resp).await;
    assert_eq!(creada["noches"], 2);
    assert_eq!(creada["resto"], 150.0);

    // Un rango que pisa la estadía deja libre solo la otra habitación.
    let req = test::TestRequest::get()
        .uri("/api/habitaciones/disponibles?fecha_ingreso=2025-01-02&fecha_egreso=2025-01-04")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let libres: Value = test::read_body_json(resp).await;
    assert_eq!(libres.as_array().unwrap().len(), 1);
    assert_eq!(libres[0]["numero"], "2");

    // El día del egreso la habitación ya se puede volver a reservar.
    let req = test::TestRequest::get()
        .uri("/api/habitaciones/disponibles?fecha_ingreso=2025-01-03&fecha_egreso=2025-01-05")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let libres: Value = test::read_body_json(resp).await;
    assert_eq!(libres.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn reserva_solapada_da_conflicto() {
    let pool = test_pool().await;
    let app = app!(pool);
    let doble = crear_habitacion!(app, "1", "doble");

    let req = test::TestRequest::post()
        .uri("/api/reservas")
        .set_json(body_reserva(doble, "2025-01-01", "2025-01-03"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::post()
        .uri("/api/reservas")
        .set_json(body_reserva(doble, "2025-01-02", "2025-01-04"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn rango_invalido_da_bad_request() {
    let pool = test_pool().await;
    let app = app!(pool);
    let doble = crear_habitacion!(app, "1", "doble");

    let req = test::TestRequest::post()
        .uri("/api/reservas")
        .set_json(body_reserva(doble, "2025-01-03", "2025-01-03"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn asignacion_automatica_elige_la_clase_justa() {
    let pool = test_pool().await;
    let app = app!(pool);
    crear_habitacion!(app, "1", "doble");
    crear_habitacion!(app, "2", "quintuple");

    let req = test::TestRequest::post()
        .uri("/api/reservas")
        .set_json(json!({
            "encargado": "ana",
            "nombre": "Marta",
            "apellido": "Gómez",
            "telefono": "1155550000",
            "fecha_ingreso": "2025-02-01",
            "fecha_egreso": "2025-02-04",
            "habitaciones": [ { "personas": 2 }, { "personas": 5 } ],
            "monto_total": 300.0,
            "senia": 0.0,
            "origen": "Booking"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let creadas: Value = test::read_body_json(resp).await;
    let creadas = creadas.as_array().unwrap();
    assert_eq!(creadas.len(), 2);
    assert_eq!(creadas[0]["habitacion"]["numero"], "1");
    assert_eq!(creadas[0]["personas"], 2);
    assert_eq!(creadas[1]["habitacion"]["numero"], "2");
    assert_eq!(creadas[1]["personas"], 5);
    assert_eq!(creadas[0]["cantidad_habitaciones"], 2);
}

#[actix_web::test]
async fn asignacion_sin_capacidad_no_crea_nada() {
    let pool = test_pool().await;
    let app = app!(pool);
    crear_habitacion!(app, "1", "doble");

    let req = test::TestRequest::post()
        .uri("/api/reservas")
        .set_json(json!({
            "encargado": "ana",
            "nombre": "Marta",
            "apellido": "Gómez",
            "telefono": "1155550000",
            "fecha_ingreso": "2025-02-01",
            "fecha_egreso": "2025-02-04",
            "habitaciones": [ { "personas": 2 }, { "personas": 5 } ],
            "monto_total": 300.0,
            "senia": 0.0,
            "origen": "agencia"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let cuerpo: Value = test::read_body_json(resp).await;
    assert_eq!(cuerpo["pedido"], 1);

    // Todo o nada: el pedido que sí entraba tampoco se guardó.
    let req = test::TestRequest::get().uri("/api/reservas").to_request();
    let reservas: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(reservas.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn kpis_de_un_dia_prorratean_la_estadia() {
    let pool = test_pool().await;
    let app = app!(pool);
    let doble = crear_habitacion!(app, "1", "doble");

    let req = test::TestRequest::post()
        .uri("/api/reservas")
        .set_json(body_reserva(doble, "2025-01-01", "2025-01-03"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::get()
        .uri("/api/estadisticas/kpis?start_date=2025-01-01&end_date=2025-01-01")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let kpis: Value = test::read_body_json(resp).await;
    assert_eq!(kpis["noches_vendidas"], 1);
    assert_eq!(kpis["ingresos_totales"], 100.0);
    assert_eq!(kpis["ocupacion"], 1.0);
    assert_eq!(kpis["adr"], 100.0);
    assert_eq!(kpis["revpar"], 100.0);
    assert_eq!(kpis["num_dias"], 1);
    assert_eq!(kpis["habitaciones_disponibles_noches"], 1);
}

#[actix_web::test]
async fn el_plan_no_reserva_nada() {
    let pool = test_pool().await;
    let app = app!(pool);
    crear_habitacion!(app, "1", "doble");

    let req = test::TestRequest::post()
        .uri("/api/reservas/plan")
        .set_json(json!({
            "fecha_ingreso": "2025-03-01",
            "fecha_egreso": "2025-03-03",
            "pedidos": [ { "personas": 2 } ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let plan: Value = test::read_body_json(resp).await;
    assert_eq!(plan["asignaciones"][0]["habitacion"]["numero"], "1");

    let req = test::TestRequest::get().uri("/api/reservas").to_request();
    let reservas: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(reservas.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn editar_una_reserva_no_choca_consigo_misma() {
    let pool = test_pool().await;
    let app = app!(pool);
    let doble = crear_habitacion!(app, "1", "doble");

    let req = test::TestRequest::post()
        .uri("/api/reservas")
        .set_json(body_reserva(doble, "2025-01-01", "2025-01-03"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let creada: Value = test::read_body_json(resp).await;
    let id = creada["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/reservas/{id}"))
        .set_json(json!({
            "encargado": "ana",
            "nombre": "Juan",
            "apellido": "Pérez",
            "telefono": "1155550000",
            "fecha_ingreso": "2025-01-01",
            "fecha_egreso": "2025-01-04",
            "habitacion_id": doble,
            "personas": 2,
            "cantidad_habitaciones": 1,
            "monto_total": 300.0,
            "senia": 50.0,
            "origen": "celular"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let actualizada: Value = test::read_body_json(resp).await;
    assert_eq!(actualizada["noches"], 3);
    assert_eq!(actualizada["precio_por_noche"], 100.0);
}

#[actix_web::test]
async fn limpieza_clasifica_por_estadia() {
    let pool = test_pool().await;
    let app = app!(pool);
    let larga = crear_habitacion!(app, "1", "doble");
    let saliente = crear_habitacion!(app, "2", "doble");

    let req = test::TestRequest::post()
        .uri("/api/reservas")
        .set_json(body_reserva(larga, "2025-01-01", "2025-01-06"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );
    let req = test::TestRequest::post()
        .uri("/api/reservas")
        .set_json(body_reserva(saliente, "2025-01-02", "2025-01-04"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::get()
        .uri("/api/reservas/limpieza?fecha=2025-01-04")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let tablero: Value = test::read_body_json(resp).await;

    // La estadía larga va por su cuarta noche y sigue: limpieza profunda.
    assert_eq!(tablero["a_limpiar_pasajero"][0]["numero"], "1");
    // La corta egresó hoy: la habitación queda a limpiar.
    assert_eq!(tablero["a_limpiar"][0]["numero"], "2");
}
