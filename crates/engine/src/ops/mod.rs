use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod logs;
mod queries;
mod terms;

/// Default per-operation deadline. A stalled database fails the operation
/// instead of blocking the caller.
const DEFAULT_DEADLINE: Duration = Duration::from_secs(1);

/// Run a block inside a DB transaction bounded by the per-operation
/// deadline, committing on success and rolling back on error or timeout.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let op = async {
            let $tx = $self.database.begin().await?;
            let result = $body;
            match result {
                Ok(value) => {
                    $tx.commit().await?;
                    Ok(value)
                }
                Err(err) => Err(err),
            }
        };
        match tokio::time::timeout($self.deadline, op).await {
            Ok(result) => result,
            Err(_) => Err(crate::EngineError::Timeout),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    deadline: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    deadline: Duration,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            deadline: DEFAULT_DEADLINE,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the per-operation deadline.
    pub fn deadline(mut self, deadline: Duration) -> EngineBuilder {
        self.deadline = deadline;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            deadline: self.deadline,
        })
    }
}
