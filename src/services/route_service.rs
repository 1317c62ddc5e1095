// src/services/route_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, Paginated},
    },
    db::{ClientRepository, RouteRepository, UserRepository},
    models::route::{
        parse_schedule_date, parse_schedule_time, Route, RouteAssignment, RouteAssignmentView,
    },
};

fn assignment_not_found() -> AppError {
    AppError::NotFound("Asignación no encontrada".to_string())
}

// Campos crus do formulário de planejamento
#[derive(Debug, Clone, Copy)]
pub struct AssignmentInput<'a> {
    pub client_id: Uuid,
    pub agent_id: Uuid,
    pub scheduled_date: &'a str,
    pub scheduled_time: Option<&'a str>,
}

#[derive(Clone)]
pub struct RouteService {
    repo: RouteRepository,
    clients: ClientRepository,
    users: UserRepository,
}

impl RouteService {
    pub fn new(repo: RouteRepository, clients: ClientRepository, users: UserRepository) -> Self {
        Self {
            repo,
            clients,
            users,
        }
    }

    pub async fn list(
        &self,
        pool: &PgPool,
        client_id: Option<Uuid>,
        params: &PageParams,
    ) -> Result<Paginated<RouteAssignmentView>, AppError> {
        let total = self.repo.count(pool, client_id).await?;
        let data = self
            .repo
            .list_page(pool, client_id, params.limit(), params.offset())
            .await?;
        Ok(Paginated::new(data, params, total))
    }

    /// Cliente e agente precisam existir, e o agente precisa ser do cliente.
    async fn bind(&self, pool: &PgPool, input: AssignmentInput<'_>) -> Result<RouteAssignment, AppError> {
        let date = parse_schedule_date(input.scheduled_date).ok_or_else(|| {
            AppError::BadRequest(format!("La fecha \"{}\" no es válida", input.scheduled_date))
        })?;
        let time = match input.scheduled_time.map(str::trim).filter(|t| !t.is_empty()) {
            Some(raw) => Some(
                parse_schedule_time(raw)
                    .ok_or_else(|| AppError::BadRequest(format!("La hora \"{}\" no es válida", raw)))?,
            ),
            None => None,
        };

        self.clients
            .find_by_id(pool, input.client_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;
        let agent = self
            .users
            .find_agent_ref(pool, input.agent_id)
            .await?
            .ok_or_else(|| AppError::not_found("Agente"))?;

        RouteAssignment::bind(input.client_id, agent, date, time)
            .map_err(|_| AppError::AgentClientMismatch)
    }

    /// Cria a rota PLANNED e uma tarefa por plantilla informada.
    pub async fn create(
        &self,
        pool: &PgPool,
        input: AssignmentInput<'_>,
        task_template_ids: &[Uuid],
    ) -> Result<Route, AppError> {
        let assignment = self.bind(pool, input).await?;

        let mut tx = pool.begin().await?;
        let route = self.repo.create(&mut *tx, &assignment).await?;
        let tasks = self
            .repo
            .create_tasks(&mut *tx, route.id, task_template_ids)
            .await?;
        tx.commit().await?;

        tracing::info!(
            "Rota {} planejada para {} com {} tarefa(s)",
            route.id,
            route.date,
            tasks
        );
        Ok(route)
    }

    pub async fn update(
        &self,
        pool: &PgPool,
        id: Uuid,
        input: AssignmentInput<'_>,
    ) -> Result<Route, AppError> {
        self.repo
            .find_by_id(pool, id)
            .await?
            .ok_or_else(assignment_not_found)?;

        let assignment = self.bind(pool, input).await?;
        self.repo
            .update(pool, id, &assignment)
            .await?
            .ok_or_else(assignment_not_found)
    }

    pub async fn delete(&self, pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        match self.repo.delete(pool, id).await? {
            0 => Err(assignment_not_found()),
            _ => Ok(()),
        }
    }
}
