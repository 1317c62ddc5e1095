// src/models/route.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "route_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Planned,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: Uuid,
    pub client_id: Uuid,
    pub agent_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub scheduled_time: NaiveTime,
    pub status: RouteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da listagem paginada
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteAssignmentView {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub agent_id: Uuid,
    pub agent_name: Option<String>,
    pub tasks_count: i64,
    #[schema(value_type = String, format = Date)]
    pub scheduled_date: NaiveDate,
    #[serde(serialize_with = "serialize_hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub scheduled_time: NaiveTime,
    pub status: RouteStatus,
}

// Referência mínima a um agente: quem é e a qual cliente pertence
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct AgentRef {
    pub id: Uuid,
    pub client_id: Uuid,
}

/// Uma visita planejada já validada. O único caminho para construí-la é `bind`,
/// que exige que o agente pertença ao cliente.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteAssignment {
    pub client_id: Uuid,
    pub agent_id: Uuid,
    pub date: NaiveDate,
    pub scheduled_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentNotInClient;

impl RouteAssignment {
    pub fn bind(
        client_id: Uuid,
        agent: AgentRef,
        date: NaiveDate,
        scheduled_time: Option<NaiveTime>,
    ) -> Result<Self, AgentNotInClient> {
        if agent.client_id != client_id {
            return Err(AgentNotInClient);
        }
        Ok(Self {
            client_id,
            agent_id: agent.id,
            date,
            scheduled_time: scheduled_time.unwrap_or_else(default_time),
        })
    }
}

pub fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Datas aceitas: `2024-01-15`, `15/01/2024`, `15-01-2024`, `2024/01/15`,
/// e também data-hora ISO (a hora é descartada).
pub fn parse_schedule_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
}

/// `HH:MM` ou `HH:MM:SS`.
pub fn parse_schedule_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn serialize_hhmm<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bind_rejects_agent_from_other_client() {
        let client = Uuid::new_v4();
        let agent = AgentRef { id: Uuid::new_v4(), client_id: Uuid::new_v4() };
        assert_eq!(
            RouteAssignment::bind(client, agent, date(2024, 1, 15), None),
            Err(AgentNotInClient)
        );
    }

    #[test]
    fn bind_defaults_to_nine_am() {
        let client = Uuid::new_v4();
        let agent = AgentRef { id: Uuid::new_v4(), client_id: client };
        let assignment = RouteAssignment::bind(client, agent, date(2024, 1, 15), None).unwrap();
        assert_eq!(assignment.agent_id, agent.id);
        assert_eq!(assignment.scheduled_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn accepts_common_date_shapes() {
        assert_eq!(parse_schedule_date("2024-01-15"), Some(date(2024, 1, 15)));
        assert_eq!(parse_schedule_date("15/01/2024"), Some(date(2024, 1, 15)));
        assert_eq!(parse_schedule_date("15-01-2024"), Some(date(2024, 1, 15)));
        assert_eq!(parse_schedule_date("2024-01-15T10:30:00Z"), Some(date(2024, 1, 15)));
        assert_eq!(parse_schedule_date("2024-01-15 10:30"), Some(date(2024, 1, 15)));
        assert_eq!(parse_schedule_date("mañana"), None);
        assert_eq!(parse_schedule_date("2024-02-30"), None);
        assert_eq!(parse_schedule_date(""), None);
    }

    #[test]
    fn parses_times() {
        assert_eq!(parse_schedule_time("10:30"), NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(parse_schedule_time("14:00:15"), NaiveTime::from_hms_opt(14, 0, 15));
        assert_eq!(parse_schedule_time("25:00"), None);
    }
}
