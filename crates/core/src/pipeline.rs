//! 파이프라인 trait -- 모듈 생명주기와 파서 확장 포인트 정의
//!
//! - [`Pipeline`]: 시작/정지/헬스 체크를 제공하는 모듈 생명주기 trait
//! - [`DynPipeline`]: `Box<dyn ...>`로 보관하기 위한 object-safe 버전
//! - [`LogParser`]: 형식별 파서가 구현하는 trait
//!
//! `Pipeline`을 구현하면 blanket impl을 통해 `DynPipeline`도 자동으로 구현됩니다.

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::error::LogharborError;
use crate::types::{FormatType, ParsedFields};

/// `DynPipeline`이 반환하는 boxed future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 모듈 헬스 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum HealthStatus {
    /// 정상 동작
    Healthy,
    /// 동작하지만 성능 저하 (사유 포함)
    Degraded(String),
    /// 동작 불가 (사유 포함)
    Unhealthy(String),
}

impl HealthStatus {
    /// 정상 상태인지 확인
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// 동작 불가 상태인지 확인
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }
}

/// 모듈 생명주기 trait
///
/// 데몬은 등록된 모듈을 순서대로 `start()`하고, 종료 시 역순으로 `stop()`합니다.
pub trait Pipeline: Send + Sync {
    /// 모듈을 시작합니다. 리스너 바인드 등 초기화 실패 시 에러를 반환합니다.
    fn start(&mut self) -> impl Future<Output = Result<(), LogharborError>> + Send;

    /// 모듈을 정지합니다. 진행 중인 작업은 가능한 범위에서 마무리합니다.
    fn stop(&mut self) -> impl Future<Output = Result<(), LogharborError>> + Send;

    /// 현재 헬스 상태를 반환합니다.
    fn health_check(&self) -> impl Future<Output = HealthStatus> + Send;
}

/// object-safe 파이프라인 trait
pub trait DynPipeline: Send + Sync {
    fn start(&mut self) -> BoxFuture<'_, Result<(), LogharborError>>;
    fn stop(&mut self) -> BoxFuture<'_, Result<(), LogharborError>>;
    fn health_check(&self) -> BoxFuture<'_, HealthStatus>;
}

impl<T: Pipeline> DynPipeline for T {
    fn start(&mut self) -> BoxFuture<'_, Result<(), LogharborError>> {
        Box::pin(Pipeline::start(self))
    }

    fn stop(&mut self) -> BoxFuture<'_, Result<(), LogharborError>> {
        Box::pin(Pipeline::stop(self))
    }

    fn health_check(&self) -> BoxFuture<'_, HealthStatus> {
        Box::pin(Pipeline::health_check(self))
    }
}

/// 파서 한 번의 시도 결과
///
/// 내부 실패(`Failed`)는 디스패처에서 `NoMatch`와 동일하게 취급되며,
/// 사유는 디버그 로그와 메트릭으로만 남습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// 문법 일치, 추출된 필드
    Matched(ParsedFields),
    /// 문법 불일치
    NoMatch,
    /// 문법은 비슷하지만 내용 해석 실패
    Failed(String),
}

impl ParseOutcome {
    /// 일치한 경우 필드를 꺼냅니다.
    pub fn into_matched(self) -> Option<ParsedFields> {
        match self {
            Self::Matched(fields) => Some(fields),
            Self::NoMatch | Self::Failed(_) => None,
        }
    }
}

/// 로그 파서 trait
///
/// 새로운 로그 형식을 지원하려면 이 trait을 구현합니다.
/// 구현은 순수 함수여야 하며 어떤 입력에도 panic하지 않아야 합니다.
pub trait LogParser: Send + Sync {
    /// 이 파서가 생성하는 형식
    fn format(&self) -> FormatType;

    /// 정규화된 텍스트 한 건을 파싱합니다.
    fn parse(&self, text: &str) -> ParseOutcome;
}
