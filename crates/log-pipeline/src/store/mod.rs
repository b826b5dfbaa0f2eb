//! 레코드 저장소 -- SQLite `logs` 테이블과 보존 정책
//!
//! [`RecordStore`]는 sea-orm 연결 하나를 감싸며, 스키마 생성/삽입/개수/보존/조회를 제공합니다.
//! 쓰기는 [`StoreWriter`] 태스크 하나만 수행하고, 다른 곳에서는 조회만 합니다.
//!
//! # 보존 정책
//! 삽입 후 행 수가 `max_logs`를 넘으면 ID가 가장 작은 행부터 초과분을 한 번에 삭제합니다.
//! 상한이 0이면 모든 행이 삭제됩니다.

pub mod entity;
pub mod writer;

pub use writer::StoreWriter;

use logharbor_core::types::{LogRecord, StoredRecord};
use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, TransactionTrait,
};
use tracing::{debug, info};

use crate::error::LogPipelineError;
use entity::{Column, Entity};

/// SQLite 레코드 저장소
///
/// 복제본은 같은 연결 풀을 공유합니다.
#[derive(Debug, Clone)]
pub struct RecordStore {
    db: DatabaseConnection,
}

impl RecordStore {
    /// 데이터베이스에 연결하고 `logs` 테이블이 없으면 생성합니다.
    ///
    /// SQLite 단일 쓰기를 위해 연결 풀 크기는 1입니다.
    pub async fn connect(database_url: &str) -> Result<Self, LogPipelineError> {
        let db = Database::connect(single_connection(database_url.to_owned())).await?;
        let store = Self { db };
        store.create_schema().await?;

        info!(database_url, "record store connected");
        Ok(store)
    }

    /// 기존 저장소를 조회 전용으로 엽니다.
    ///
    /// 스키마를 만들지 않으며, SQLite URL은 `mode=ro`로 열어 파일이 없으면 에러를 반환합니다.
    pub async fn open_read_only(database_url: &str) -> Result<Self, LogPipelineError> {
        let db = Database::connect(single_connection(read_only_url(database_url))).await?;
        debug!(database_url, "record store opened read-only");
        Ok(Self { db })
    }

    async fn create_schema(&self) -> Result<(), LogPipelineError> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema
            .create_table_from_entity(Entity)
            .if_not_exists()
            .to_owned();
        self.db.execute(backend.build(&stmt)).await?;
        Ok(())
    }

    /// 레코드 한 건을 트랜잭션 안에서 삽입하고 새 행 ID를 반환합니다.
    ///
    /// 실패 시 트랜잭션은 drop과 함께 롤백됩니다.
    pub async fn insert(&self, record: &LogRecord) -> Result<i64, LogPipelineError> {
        let txn = self.db.begin().await?;
        let result = Entity::insert(entity::ActiveModel::from(record))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(result.last_insert_id)
    }

    /// 저장된 행 수
    pub async fn count(&self) -> Result<u64, LogPipelineError> {
        Ok(Entity::find().count(&self.db).await?)
    }

    /// 행 수가 `cap`을 넘으면 가장 오래된 행부터 삭제하고 삭제한 행 수를 반환합니다.
    pub async fn enforce_retention(&self, cap: u64) -> Result<u64, LogPipelineError> {
        let total = self.count().await?;
        if total <= cap {
            return Ok(0);
        }
        let excess = total - cap;

        let oldest = Query::select()
            .column(Column::Id)
            .from(Entity)
            .order_by(Column::Id, Order::Asc)
            .limit(excess)
            .to_owned();

        let result = Entity::delete_many()
            .filter(Column::Id.in_subquery(oldest))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// 최근 레코드를 ID 내림차순으로 최대 `limit`건 반환합니다.
    pub async fn recent(&self, limit: u64) -> Result<Vec<StoredRecord>, LogPipelineError> {
        Entity::find()
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(StoredRecord::try_from)
            .collect()
    }

    /// 연결을 닫습니다.
    pub async fn close(self) -> Result<(), LogPipelineError> {
        self.db.close().await?;
        Ok(())
    }
}

fn single_connection(url: String) -> ConnectOptions {
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    options
}

/// SQLite 파일 URL의 `mode` 파라미터를 `ro`로 바꿉니다. 다른 URL은 그대로 둡니다.
fn read_only_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.contains(":memory:") {
        return url.to_owned();
    }
    let (base, query) = url.split_once('?').unwrap_or((url, ""));
    let mut params: Vec<&str> = query
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("mode="))
        .collect();
    params.push("mode=ro");
    format!("{base}?{}", params.join("&"))
}
