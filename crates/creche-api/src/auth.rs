use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};

use creche_types::api::{
    Claims, LoginAlunoRequest, LoginDocenteRequest, LoginResponse, LoginUser,
    RegisterAlunoRequest, RegisterDocenteRequest, RegisterResponse,
};
use creche_types::models::UserKind;

use crate::error::{ApiError, conflict_or_internal};
use crate::{AppState, blocking};

const TOKEN_TTL_HOURS: i64 = 24;

/// Strips everything that is not an ASCII digit, so "123.456.789-00" and
/// "12345678900" identify the same person. Idempotent.
pub fn normalize_cpf(cpf: &str) -> String {
    cpf.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn require(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ApiError::Validation(message.to_string())),
    }
}

pub async fn register_aluno(
    State(state): State<AppState>,
    Json(req): Json<RegisterAlunoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    const MSG: &str = "Campos nome, cpf e matricula são obrigatórios";
    let nome = require(req.nome, MSG)?;
    let cpf = normalize_cpf(&require(req.cpf, MSG)?);
    let matricula = require(req.matricula, MSG)?;
    if cpf.is_empty() {
        return Err(ApiError::Validation(MSG.to_string()));
    }

    let db = state.clone();
    let (cpf_check, matricula_check) = (cpf.clone(), matricula.clone());
    if blocking(move || db.db.aluno_exists(&matricula_check, &cpf_check)).await? {
        return Err(ApiError::Conflict("Aluno já cadastrado".to_string()));
    }

    let db = state.clone();
    let id = blocking(move || db.db.create_aluno(&nome, &cpf, &matricula))
        .await
        .map_err(|e| conflict_or_internal(e, "Aluno já cadastrado"))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id,
            message: "Aluno cadastrado com sucesso".to_string(),
        }),
    ))
}

pub async fn register_docente(
    State(state): State<AppState>,
    Json(req): Json<RegisterDocenteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    const MSG: &str = "Campos nome, identificador e senha são obrigatórios";
    let nome = require(req.nome, MSG)?;
    let identificador = require(req.identificador, MSG)?;
    let senha = require(req.senha, MSG)?;

    let db = state.clone();
    let ident_check = identificador.clone();
    if blocking(move || db.db.find_docente_by_identificador(&ident_check))
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Docente já cadastrado".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let senha_hash = Argon2::default()
        .hash_password(senha.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hash: {}", e)))?
        .to_string();

    let db = state.clone();
    let id = blocking(move || db.db.create_docente(&nome, &identificador, &senha_hash))
        .await
        .map_err(|e| conflict_or_internal(e, "Docente já cadastrado"))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id,
            message: "Docente cadastrado com sucesso".to_string(),
        }),
    ))
}

pub async fn login_aluno(
    State(state): State<AppState>,
    Json(req): Json<LoginAlunoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    const MSG: &str = "Campos matricula e cpf são obrigatórios";
    let matricula = require(req.matricula, MSG)?;
    let cpf = normalize_cpf(&require(req.cpf, MSG)?);

    let db = state.clone();
    let aluno = blocking(move || db.db.find_aluno_by_credentials(&matricula, &cpf))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let token = create_token(
        &state.jwt_secret,
        aluno.id,
        UserKind::Aluno,
        &aluno.nome,
        Some(&aluno.matricula),
    )?;

    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            id: aluno.id,
            nome: aluno.nome,
            kind: UserKind::Aluno,
        },
    }))
}

pub async fn login_docente(
    State(state): State<AppState>,
    Json(req): Json<LoginDocenteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    const MSG: &str = "Campos identificador e senha são obrigatórios";
    let identificador = require(req.identificador, MSG)?;
    let senha = require(req.senha, MSG)?;

    let db = state.clone();
    let docente = blocking(move || db.db.find_docente_by_identificador(&identificador))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&docente.senha_hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash invalid: {}", e)))?;

    Argon2::default()
        .verify_password(senha.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let token = create_token(&state.jwt_secret, docente.id, UserKind::Docente, &docente.nome, None)?;

    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            id: docente.id,
            nome: docente.nome,
            kind: UserKind::Docente,
        },
    }))
}

fn create_token(
    secret: &str,
    sub: i64,
    kind: UserKind,
    nome: &str,
    matricula: Option<&str>,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub,
        kind,
        nome: nome.to_string(),
        matricula: matricula.map(str::to_string),
        exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn normalize_cpf_strips_formatting() {
        assert_eq!(normalize_cpf("123.456.789-00"), "12345678900");
        assert_eq!(normalize_cpf("12345678900"), "12345678900");
    }

    #[test]
    fn normalize_cpf_is_idempotent() {
        let once = normalize_cpf("111.222.333-44");
        assert_eq!(normalize_cpf(&once), once);
    }

    #[test]
    fn stored_hash_never_equals_plaintext() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"admin123", &salt)
            .unwrap()
            .to_string();
        assert_ne!(hash, "admin123");

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"admin123", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }

    #[test]
    fn token_roundtrip_carries_subject_and_kind() {
        let token = create_token("segredo", 7, UserKind::Docente, "Prof", None).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"segredo"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, 7);
        assert_eq!(data.claims.kind, UserKind::Docente);
        assert_eq!(data.claims.nome, "Prof");
        assert_eq!(data.claims.matricula, None);
    }

    #[test]
    fn aluno_token_embeds_matricula() {
        let token = create_token("segredo", 3, UserKind::Aluno, "Ana", Some("A1")).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"segredo"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.kind, UserKind::Aluno);
        assert_eq!(data.claims.matricula.as_deref(), Some("A1"));
    }
}
