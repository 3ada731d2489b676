use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;

use creche_types::api::{CreatedResponse, EventoRequest};
use creche_types::models::{CalendarioEvento, UserKind};

use crate::error::{ApiError, conflict_or_internal};
use crate::middleware::extract_claims;
use crate::{AppState, blocking, parse_stored_date};

/// Params arrive as strings so a non-numeric value maps to a JSON 400
/// instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub year: Option<String>,
    pub month: Option<String>,
    pub teacher_id: Option<String>,
}

/// Closed interval covering one calendar month: the last day falls out of
/// the first day of the following month, which keeps leap years right.
fn month_interval(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_month.pred_opt()?))
}

pub async fn list_eventos(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (year, month) = match (query.year.as_deref(), query.month.as_deref()) {
        (Some(y), Some(m)) => {
            let year = y.trim().parse::<i32>().map_err(|_| {
                ApiError::Validation("Parâmetros year e month devem ser numéricos".to_string())
            })?;
            let month = m.trim().parse::<u32>().map_err(|_| {
                ApiError::Validation("Parâmetros year e month devem ser numéricos".to_string())
            })?;
            (year, month)
        }
        _ => {
            return Err(ApiError::Validation(
                "Parâmetros year e month são obrigatórios".to_string(),
            ));
        }
    };
    let (start, end) = month_interval(year, month)
        .ok_or_else(|| ApiError::Validation("Mês inválido".to_string()))?;

    let teacher_id = query
        .teacher_id
        .as_deref()
        .map(|t| t.trim().parse::<i64>())
        .transpose()
        .map_err(|_| ApiError::Validation("Parâmetro teacher_id deve ser numérico".to_string()))?;

    let db = state.clone();
    let rows = blocking(move || {
        db.db
            .list_eventos(&start.to_string(), &end.to_string(), teacher_id)
    })
    .await?;

    let eventos: Vec<CalendarioEvento> = rows
        .into_iter()
        .map(|row| CalendarioEvento {
            id: row.id,
            docente_id: row.docente_id,
            data: parse_stored_date(&row.data),
            titulo: row.titulo,
            cor: row.cor,
        })
        .collect();
    Ok(Json(eventos))
}

pub async fn create_evento(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<EventoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = extract_claims(&headers, &state.jwt_secret)?;

    const MSG: &str = "Campos date e title são obrigatórios";
    let data = req
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(MSG.to_string()))?
        .parse::<NaiveDate>()
        .map_err(|_| ApiError::Validation("Data inválida, use o formato AAAA-MM-DD".to_string()))?;
    let titulo = match req.title {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => return Err(ApiError::Validation(MSG.to_string())),
    };
    let cor = req.color.unwrap_or_else(|| "blue".to_string());

    // Events created by a teacher are owned by them; student tokens can
    // still annotate the shared calendar without an owner.
    let docente_id = (claims.kind == UserKind::Docente).then_some(claims.sub);

    let db = state.clone();
    let id = blocking(move || db.db.create_evento(docente_id, &data.to_string(), &titulo, &cor))
        .await
        .map_err(|e| conflict_or_internal(e, "Já existe um evento nesta data"))?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn february_leap_year_ends_on_the_29th() {
        let (start, end) = month_interval(2024, 2).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn february_common_year_ends_on_the_28th() {
        let (_, end) = month_interval(2023, 2).unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
    }

    #[test]
    fn december_wraps_into_the_next_year() {
        let (start, end) = month_interval(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(month_interval(2024, 0).is_none());
        assert!(month_interval(2024, 13).is_none());
    }
}
