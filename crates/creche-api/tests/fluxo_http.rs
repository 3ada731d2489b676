use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use creche_api::AppStateInner;
use creche_db::Database;

fn app() -> Router {
    let db = Database::open_in_memory().expect("in-memory database");
    creche_api::router(Arc::new(AppStateInner {
        db,
        jwt_secret: "segredo-de-teste".to_string(),
    }))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_auth(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn docente_token(app: &Router) -> String {
    let (status, _) = send(
        app,
        post(
            "/register/docente",
            json!({ "nome": "Prof Admin", "identificador": "admin", "senha": "admin123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        post(
            "/login/docente",
            json!({ "identificador": "admin", "senha": "admin123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn cenario_ana_registro_e_login() {
    let app = app();

    // Register Ana with a formatted CPF.
    let (status, body) = send(
        &app,
        post(
            "/register/aluno",
            json!({ "nome": "Ana", "cpf": "111.222.333-44", "matricula": "A1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_i64().unwrap() > 0);

    // Same CPF under a different matricula is a duplicate.
    let (status, _) = send(
        &app,
        post(
            "/register/aluno",
            json!({ "nome": "Ana", "cpf": "11122233344", "matricula": "A2" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Login with the raw digits succeeds (normalization made them equal).
    let (status, body) = send(
        &app,
        post("/login/aluno", json!({ "matricula": "A1", "cpf": "11122233344" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["nome"], "Ana");
    assert_eq!(body["user"]["kind"], "aluno");

    // Wrong CPF is a generic 401.
    let (status, _) = send(
        &app,
        post("/login/aluno", json!({ "matricula": "A1", "cpf": "00000000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registro_sem_campos_obrigatorios_retorna_400() {
    let app = app();

    let (status, body) = send(
        &app,
        post("/register/aluno", json!({ "nome": "Ana", "cpf": "11122233344" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());

    // Blank counts as missing.
    let (status, _) = send(
        &app,
        post(
            "/register/aluno",
            json!({ "nome": "  ", "cpf": "11122233344", "matricula": "A1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was stored: registering properly afterwards works.
    let (status, _) = send(
        &app,
        post(
            "/register/aluno",
            json!({ "nome": "Ana", "cpf": "11122233344", "matricula": "A1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn login_docente_nao_distingue_usuario_de_senha_errada() {
    let app = app();
    let _token = docente_token(&app).await;

    let (wrong_password, body_a) = send(
        &app,
        post(
            "/login/docente",
            json!({ "identificador": "admin", "senha": "errada" }),
        ),
    )
    .await;
    let (unknown_user, body_b) = send(
        &app,
        post(
            "/login/docente",
            json!({ "identificador": "ninguem", "senha": "admin123" }),
        ),
    )
    .await;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn docente_duplicado_retorna_409() {
    let app = app();
    let _token = docente_token(&app).await;

    let (status, _) = send(
        &app,
        post(
            "/register/docente",
            json!({ "nome": "Outro", "identificador": "admin", "senha": "outra123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn rotas_protegidas_exigem_token() {
    let app = app();

    let (status, _) = send(&app, get("/turmas")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = docente_token(&app).await;
    let (status, body) = send(&app, get_auth("/turmas", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn fluxo_turma_matricula_e_registro() {
    let app = app();
    let token = docente_token(&app).await;

    let (status, body) = send(
        &app,
        post_auth("/turmas", &token, json!({ "nome": "Turma A", "ano": "2024" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let turma_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        post(
            "/register/aluno",
            json!({ "nome": "Ana", "cpf": "11122233344", "matricula": "A1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let aluno_id = body["id"].as_i64().unwrap();

    // Enroll, then enroll again: the pair is unique.
    let uri = format!("/turmas/{turma_id}/alunos");
    let (status, _) = send(&app, post_auth(&uri, &token, json!({ "aluno_id": aluno_id }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, post_auth(&uri, &token, json!({ "aluno_id": aluno_id }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, get_auth(&uri, &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["matricula"], "A1");

    // One daily record per student per date.
    let registro = json!({
        "aluno_id": aluno_id,
        "turma_id": turma_id,
        "data": "2024-03-01",
        "alimentacao": "Bom",
        "comportamento": "Ótimo"
    });
    let (status, _) = send(&app, post_auth("/registros", &token, registro.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, post_auth("/registros", &token, registro)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, get_auth(&format!("/registros/{aluno_id}"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["presenca"], "Presente");

    // Unenroll and delete the class.
    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/turmas/{turma_id}/alunos/{aluno_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/turmas/{turma_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn calendario_fevereiro_bissexto() {
    let app = app();
    let token = docente_token(&app).await;

    let (status, _) = send(
        &app,
        post_auth(
            "/api/events",
            &token,
            json!({ "date": "2024-02-29", "title": "Festa junina de ensaio" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Creation without a token is refused.
    let (status, _) = send(
        &app,
        post("/api/events", json!({ "date": "2024-03-01", "title": "Passeio" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get("/api/events?year=2024&month=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["data"], "2024-02-29");

    let (status, body) = send(&app, get("/api/events?year=2024&month=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    // The listing requires the year+month window.
    let (status, _) = send(&app, get("/api/events")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn calendario_parametros_nao_numericos_retornam_400_json() {
    let app = app();

    let (status, body) = send(&app, get("/api/events?year=abc&month=2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());

    let (status, body) = send(&app, get("/api/events?year=2024&month=2&teacher_id=x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn health_reporta_saudavel() {
    let app = app();
    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn rota_desconhecida_retorna_404_json() {
    let app = app();
    let (status, body) = send(&app, get("/nada/por/aqui")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
}
