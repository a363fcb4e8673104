use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{App, test};
use serde_json::{Value, json};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::hash_password;
use crate::config::Config;
use crate::model::employee::{Employee, fixtures::employee};
use crate::model::role::Role;
use crate::payroll::PayrollBatch;
use crate::payroll::clock::FixedClock;
use crate::payroll::dispatcher::Notifier;
use crate::payroll::dispatcher::fakes::ScriptedTransport;
use crate::payroll::store::fakes::MemoryDocumentStore;
use crate::repository::{EmployeeRepository, InMemoryRoster};
use crate::routes;

struct Ctx {
    config: Config,
    roster: Arc<dyn EmployeeRepository>,
    batch: Arc<PayrollBatch>,
    store: Arc<MemoryDocumentStore>,
    transport: Arc<ScriptedTransport>,
}

impl Ctx {
    fn new(clock: FixedClock) -> Self {
        let config = Config::for_tests();
        let roster: Arc<dyn EmployeeRepository> = Arc::new(InMemoryRoster::new(roster()));
        let store = Arc::new(MemoryDocumentStore::default());
        let transport = Arc::new(ScriptedTransport::default());
        let notifier = Notifier::new(transport.clone(), store.clone(), &config.sender_email);
        let batch = Arc::new(PayrollBatch::new(
            roster.clone(),
            store.clone(),
            notifier,
            Arc::new(clock),
            config.payroll_time,
        ));
        Self {
            config,
            roster,
            batch,
            store,
            transport,
        }
    }

    fn token_for(&self, employee: &Employee) -> String {
        let (token, _) =
            generate_access_token(employee, &self.config.jwt_secret, 900).unwrap();
        format!("Bearer {token}")
    }

    fn hr_token(&self) -> String {
        self.token_for(&hr())
    }

    fn staff_token(&self) -> String {
        self.token_for(&staff())
    }
}

macro_rules! app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(Data::new($ctx.config.clone()))
                .app_data(Data::from($ctx.roster.clone()))
                .app_data(Data::from($ctx.batch.clone()))
                .configure(|cfg| routes::configure(cfg, $ctx.config.clone())),
        )
        .await
    };
}

fn hr() -> Employee {
    let mut ana = employee(1, "Ana", "Ruiz");
    ana.role = Role::HrManager;
    ana
}

fn staff() -> Employee {
    employee(2, "Luis", "Gomez")
}

fn roster() -> Vec<Employee> {
    let mut ana = hr();
    ana.credential = hash_password("clave123").unwrap();
    let mut luis = staff();
    luis.credential = hash_password("luis123").unwrap();
    vec![ana, luis]
}

fn request(method: &str, uri: &str) -> test::TestRequest {
    let req = match method {
        "GET" => test::TestRequest::get(),
        "POST" => test::TestRequest::post(),
        "PUT" => test::TestRequest::put(),
        "DELETE" => test::TestRequest::delete(),
        other => panic!("unsupported method {other}"),
    };
    req.uri(uri).peer_addr("127.0.0.1:40000".parse().unwrap())
}

fn new_employee_body() -> Value {
    json!({
        "correo": "eva.diaz@empresa.co",
        "nombre": "Eva",
        "apellido": "Diaz",
        "rol": "empleado",
        "salario_base": 1800,
        "deducciones": [{"concepto": "salud", "monto": 72}],
        "bonificaciones": [],
        "contrasena": "eva123",
        "direccion": "Carrera 7 # 12-30",
        "celular": "3109876543",
        "superadmin": false
    })
}

#[actix_web::test]
async fn login_issues_token_usable_on_protected_routes() {
    let ctx = Ctx::new(FixedClock::at(10, 0, 0));
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        request("POST", "/auth/login")
            .set_json(json!({"id": 1, "contrasena": "clave123"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        request("GET", "/api/employees")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let employees: Value = test::read_body_json(resp).await;
    assert_eq!(employees.as_array().unwrap().len(), 2);
    assert!(employees[0].get("contrasena").is_none());
}

#[actix_web::test]
async fn login_with_wrong_credential_is_unauthorized() {
    let ctx = Ctx::new(FixedClock::at(10, 0, 0));
    let app = app!(ctx);

    for body in [
        json!({"id": 1, "contrasena": "nope"}),
        json!({"id": 99, "contrasena": "clave123"}),
    ] {
        let resp = test::call_service(
            &app,
            request("POST", "/auth/login").set_json(body).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn protected_routes_need_a_bearer_token() {
    let ctx = Ctx::new(FixedClock::at(10, 0, 0));
    let app = app!(ctx);

    let resp = test::call_service(&app, request("GET", "/api/employees").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        request("GET", "/api/employees")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_revokes_the_token() {
    let ctx = Ctx::new(FixedClock::at(10, 0, 0));
    let app = app!(ctx);
    let token = ctx.hr_token();

    let resp = test::call_service(
        &app,
        request("POST", "/auth/logout")
            .insert_header(("Authorization", token.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(
        &app,
        request("GET", "/api/employees")
            .insert_header(("Authorization", token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn staff_sees_only_own_record() {
    let ctx = Ctx::new(FixedClock::at(10, 0, 0));
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        request("GET", "/api/employees")
            .insert_header(("Authorization", ctx.staff_token()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(
        &app,
        request("GET", "/api/employees/2")
            .insert_header(("Authorization", ctx.staff_token()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["nombre"], "Luis");

    let resp = test::call_service(
        &app,
        request("GET", "/api/employees/1")
            .insert_header(("Authorization", ctx.staff_token()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn hr_creates_employee_with_next_id() {
    let ctx = Ctx::new(FixedClock::at(10, 0, 0));
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        request("POST", "/api/employees")
            .insert_header(("Authorization", ctx.hr_token()))
            .set_json(new_employee_body())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["id"], 3);
    assert!(created.get("contrasena").is_none());

    let stored = ctx.roster.get(3).await.unwrap().unwrap();
    assert_ne!(stored.credential, "eva123");
}

#[actix_web::test]
async fn create_rejects_bad_phone_and_missing_fields() {
    let ctx = Ctx::new(FixedClock::at(10, 0, 0));
    let app = app!(ctx);

    let mut bad_phone = new_employee_body();
    bad_phone["celular"] = json!("310-987");
    let mut missing = new_employee_body();
    missing.as_object_mut().unwrap().remove("direccion");

    for body in [bad_phone, missing] {
        let resp = test::call_service(
            &app,
            request("POST", "/api/employees")
                .insert_header(("Authorization", ctx.hr_token()))
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
    assert_eq!(ctx.roster.list().await.unwrap().len(), 2);
}

#[actix_web::test]
async fn staff_cannot_create_employees() {
    let ctx = Ctx::new(FixedClock::at(10, 0, 0));
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        request("POST", "/api/employees")
            .insert_header(("Authorization", ctx.staff_token()))
            .set_json(new_employee_body())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn hr_updates_salary_and_deletes() {
    let ctx = Ctx::new(FixedClock::at(10, 0, 0));
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        request("PUT", "/api/employees/2")
            .insert_header(("Authorization", ctx.hr_token()))
            .set_json(json!({"salario_base": 2500, "rol": "gestor_rrhh"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let luis = ctx.roster.get(2).await.unwrap().unwrap();
    assert_eq!(luis.base_salary, 2500.0);
    assert_eq!(luis.role, Role::HrManager);
    assert_eq!(luis.first_name, "Luis");

    let resp = test::call_service(
        &app,
        request("DELETE", "/api/employees/2")
            .insert_header(("Authorization", ctx.hr_token()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        request("DELETE", "/api/employees/2")
            .insert_header(("Authorization", ctx.hr_token()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn payroll_run_outside_payroll_minute_is_rejected() {
    let ctx = Ctx::new(FixedClock::at(17, 59, 0));
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        request("POST", "/api/payroll/run")
            .insert_header(("Authorization", ctx.hr_token()))
            .set_json(serde_json::to_value(vec![staff()]).unwrap())
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.store.len(), 0);
    assert!(ctx.transport.sent().is_empty());
}

#[actix_web::test]
async fn payroll_run_with_empty_list_is_rejected() {
    let ctx = Ctx::new(FixedClock::at(18, 0, 0));
    let app = app!(ctx);

    for body in ["[]", ""] {
        let resp = test::call_service(
            &app,
            request("POST", "/api/payroll/run")
                .insert_header(("Authorization", ctx.hr_token()))
                .insert_header(("Content-Type", "application/json"))
                .set_payload(body)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
    assert!(ctx.transport.sent().is_empty());
}

#[actix_web::test]
async fn payroll_run_at_payroll_minute_reports_each_employee() {
    let ctx = Ctx::new(FixedClock::at(18, 0, 30));
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        request("POST", "/api/payroll/run")
            .insert_header(("Authorization", ctx.hr_token()))
            .set_json(serde_json::to_value(vec![hr(), staff()]).unwrap())
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["mensaje"], "Pago de nóminas realizado");
    assert_eq!(body["resultado"]["delivered"], 2);
    assert_eq!(body["resultado"]["outcomes"][1]["employee_id"], 2);
    assert_eq!(body["resultado"]["outcomes"][1]["status"], "delivered");
    assert_eq!(ctx.transport.sent().len(), 2);
}

#[actix_web::test]
async fn staff_cannot_run_payroll() {
    let ctx = Ctx::new(FixedClock::at(18, 0, 0));
    let app = app!(ctx);

    let resp = test::call_service(
        &app,
        request("POST", "/api/payroll/run")
            .insert_header(("Authorization", ctx.staff_token()))
            .set_json(serde_json::to_value(vec![staff()]).unwrap())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(ctx.transport.sent().is_empty());
}
