use deadpool_sqlite::rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::errors::RackyardError;

/// Label entity attached to nodes, many-to-many. Role rows are append-only:
/// every PUT on the roles sub-resource inserts fresh rows, so names may
/// repeat across rows.
#[derive(Serialize, Debug, Clone)]
pub struct Role {
    #[serde(skip_serializing)]
    pub id: i64,

    pub name: String,
}

/// Role descriptor as it appears in PUT bodies.
#[derive(Deserialize, Debug, Clone)]
pub struct RoleParams {
    pub name: String,
}

impl Role {
    pub fn insert(conn: &Connection, name: &str) -> Result<Self, RackyardError> {
        conn.execute("INSERT INTO roles (name) VALUES (?1)", params![name])?;

        Ok(Self {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn find_by_node_id(conn: &Connection, node_id: i64) -> Result<Vec<Self>, RackyardError> {
        let mut stmt = conn.prepare(
            "SELECT roles.id, roles.name FROM roles \
             JOIN node_roles ON node_roles.role_id = roles.id \
             WHERE node_roles.node_id = ?1 ORDER BY node_roles.position",
        )?;

        let roles = stmt
            .query_map(params![node_id], |row| {
                Ok(Self {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(roles)
    }
}
