use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::db::{
    connection::Database,
    helpers::{from_json, parse_datetime, to_json},
    models::{KnowledgeGraph, StoredGraph},
};

impl Database {
    pub async fn save_graph(
        &self,
        user_id: i64,
        graph: KnowledgeGraph,
        updated_at: DateTime<Utc>,
    ) -> Result<StoredGraph> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO knowledge_graphs (user_id, graph_json, last_updated)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                     graph_json = excluded.graph_json,
                     last_updated = excluded.last_updated",
                params![user_id, to_json(&graph, "graph_json")?, updated_at.to_rfc3339()],
            )?;
            Ok(StoredGraph {
                user_id,
                graph,
                last_updated: updated_at,
            })
        })
        .await
    }

    pub async fn get_graph(&self, user_id: i64) -> Result<Option<StoredGraph>> {
        self.execute(move |conn| {
            let row: Option<(String, String)> = conn
                .query_row(
                    "SELECT graph_json, last_updated FROM knowledge_graphs WHERE user_id = ?1",
                    params![user_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            row.map(|(graph, updated)| -> Result<StoredGraph> {
                Ok(StoredGraph {
                    user_id,
                    graph: from_json(&graph, "graph_json")?,
                    last_updated: parse_datetime(&updated, "last_updated")?,
                })
            })
            .transpose()
        })
        .await
    }
}
