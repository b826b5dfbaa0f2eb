//! `logs` 테이블 엔티티

use logharbor_core::types::{FormatType, LogRecord, StoredRecord};
use sea_orm::Set;
use sea_orm::entity::prelude::*;

use crate::error::LogPipelineError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: String,
    pub host: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub format_type: String,
    #[sea_orm(column_type = "Text")]
    pub raw: String,
    pub sev: Option<String>,
    pub user: Option<String>,
    pub dvc: Option<String>,
    pub msgid: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LogRecord> for ActiveModel {
    fn from(record: &LogRecord) -> Self {
        Self {
            timestamp: Set(record.timestamp.clone()),
            host: Set(record.host.clone()),
            message: Set(record.message.clone()),
            format_type: Set(record.format_type.as_str().to_owned()),
            raw: Set(record.raw.clone()),
            sev: Set(record.severity.clone()),
            user: Set(record.user.clone()),
            dvc: Set(record.device.clone()),
            msgid: Set(record.message_id.clone()),
            ..Default::default()
        }
    }
}

impl TryFrom<Model> for StoredRecord {
    type Error = LogPipelineError;

    fn try_from(row: Model) -> Result<Self, Self::Error> {
        let format_type = row
            .format_type
            .parse::<FormatType>()
            .map_err(|reason| LogPipelineError::CorruptRow { id: row.id, reason })?;

        Ok(StoredRecord {
            id: row.id,
            record: LogRecord {
                timestamp: row.timestamp,
                host: row.host,
                message: row.message,
                format_type,
                raw: row.raw,
                severity: row.sev,
                user: row.user,
                device: row.dvc,
                message_id: row.msgid,
            },
        })
    }
}
