//! Role Routes
//!
//! Derived authorization for dashboards, plus the admin-side staff
//! assignment transactions.
//!
//! - GET  /api/v1/roles/:address
//! - POST /api/v1/admin/inspectors - assign inspector to a location
//! - POST /api/v1/admin/employees - assign employee to a department

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{AssignStaffRequest, RoleResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::chain::TxOutcome;
use crate::roles::derive_roles;

use super::parse_addr;

/// GET /api/v1/roles/:address
///
/// Classify a wallet. The two on-chain reads fail soft to zero: an
/// unreachable node classifies the wallet as a plain citizen rather
/// than failing the request, matching how the dashboards degrade.
pub async fn get_roles(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let account = parse_addr(&address)?;

    let inspector_location = match state.registry.inspector_location(account).await {
        Ok(loc) => loc,
        Err(e) => {
            tracing::warn!(error = %e, "Inspector read failed; treating as unassigned");
            0
        }
    };

    let employee_department = match state.registry.employee_department(account).await {
        Ok(dept) => dept,
        Err(e) => {
            tracing::warn!(error = %e, "Employee read failed; treating as unassigned");
            0
        }
    };

    let flags = derive_roles(
        account,
        state.chain.admin_address(),
        inspector_location,
        employee_department,
    );

    Ok(Json(RoleResponse::from_flags(&address, flags)))
}

/// POST /api/v1/admin/inspectors
pub async fn assign_inspector(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssignStaffRequest>,
) -> ApiResult<Json<TxOutcome>> {
    let account = parse_addr(&req.address)?;
    Ok(Json(
        state
            .registry
            .assign_inspector(account, req.assignment_id)
            .await?,
    ))
}

/// POST /api/v1/admin/employees
pub async fn assign_employee(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssignStaffRequest>,
) -> ApiResult<Json<TxOutcome>> {
    let account = parse_addr(&req.address)?;
    Ok(Json(
        state
            .registry
            .assign_employee(account, req.assignment_id)
            .await?,
    ))
}
