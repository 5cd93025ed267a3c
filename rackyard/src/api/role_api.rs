use actix_web::{get, put, web, HttpResponse};
use deadpool_sqlite::Pool;

use crate::api::request::StrictJson;
use crate::api::types::Response;
use crate::errors::RackyardError;
use crate::models::node::Node;
use crate::models::role::RoleParams;

#[get("/{name}/roles")]
pub async fn get_node_roles(db_pool: web::Data<Pool>, path: web::Path<(i64, String)>) -> Response {
    let (environment_id, name) = path.into_inner();

    let conn = db_pool
        .get()
        .await
        .map_err(|e| RackyardError::PoolError(e.to_string()))?;

    let roles = conn
        .interact(move |conn| {
            let node = Node::find_by_environment_id_and_name(conn, environment_id, &name)?;

            node.roles(conn)
        })
        .await
        .map_err(|e| RackyardError::InternalServerError(e.to_string()))??;

    Ok(HttpResponse::Ok().json(roles))
}

#[put("/{name}/roles")]
pub async fn update_node_roles(
    db_pool: web::Data<Pool>,
    path: web::Path<(i64, String)>,
    payload: StrictJson<Vec<RoleParams>>,
) -> Response {
    let (environment_id, name) = path.into_inner();
    let role_params = payload.into_inner();

    let conn = db_pool
        .get()
        .await
        .map_err(|e| RackyardError::PoolError(e.to_string()))?;

    let roles = conn
        .interact(move |conn| {
            let node = Node::find_by_environment_id_and_name(conn, environment_id, &name)?;

            node.append_roles(conn, &role_params)?;
            node.roles(conn)
        })
        .await
        .map_err(|e| RackyardError::InternalServerError(e.to_string()))??;

    Ok(HttpResponse::Ok().json(roles))
}
