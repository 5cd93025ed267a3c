use actix_web::{get, put, web, HttpResponse};
use deadpool_sqlite::Pool;

use crate::api::request::StrictJson;
use crate::api::types::Response;
use crate::errors::RackyardError;
use crate::models::node::{Node, NodeMetadata};

/// GET on the bare collection: the environment's nodes, ordered by name.
pub async fn get_nodes(db_pool: web::Data<Pool>, path: web::Path<i64>) -> Response {
    let environment_id = path.into_inner();

    let conn = db_pool
        .get()
        .await
        .map_err(|e| RackyardError::PoolError(e.to_string()))?;

    let nodes = conn
        .interact(move |conn| Node::find_by_environment_id(conn, environment_id))
        .await
        .map_err(|e| RackyardError::InternalServerError(e.to_string()))??;

    Ok(HttpResponse::Ok().json(nodes))
}

#[get("/{name}")]
pub async fn get_node(db_pool: web::Data<Pool>, path: web::Path<(i64, String)>) -> Response {
    let (environment_id, name) = path.into_inner();

    let conn = db_pool
        .get()
        .await
        .map_err(|e| RackyardError::PoolError(e.to_string()))?;

    let node = conn
        .interact(move |conn| Node::find_by_environment_id_and_name(conn, environment_id, &name))
        .await
        .map_err(|e| RackyardError::InternalServerError(e.to_string()))??;

    Ok(HttpResponse::Ok().json(node))
}

#[put("/{name}")]
pub async fn update_node(
    db_pool: web::Data<Pool>,
    path: web::Path<(i64, String)>,
    payload: StrictJson<NodeMetadata>,
) -> Response {
    let (environment_id, name) = path.into_inner();
    let metadata = payload.into_inner();

    metadata.validate()?;

    let conn = db_pool
        .get()
        .await
        .map_err(|e| RackyardError::PoolError(e.to_string()))?;

    let node = conn
        .interact(move |conn| Node::create_or_update(conn, environment_id, &name, metadata))
        .await
        .map_err(|e| RackyardError::InternalServerError(e.to_string()))??;

    Ok(HttpResponse::Ok().json(node))
}

/// PUT on the bare collection: the node name segment is required.
pub async fn update_node_missing_name() -> Response {
    Err(RackyardError::MissingIdentifier("node name"))
}
