pub mod errors;
pub mod factory;
pub mod service;

use serde::Serialize;

use crate::catalog::{Kind, Model, Motion, ReconcileResult, Stage};
use crate::semantic::GenerateReport;
pub use errors::AppError;
pub use factory::AppFactory;
pub use service::CatalogService;

/// Result of an operation on one catalog kind.
#[derive(Debug, Clone, Serialize)]
pub struct KindReport<R> {
    pub kind: Kind,
    #[serde(flatten)]
    pub report: R,
}

/// The three catalogs, each behind its own service.
pub struct App {
    pub models: CatalogService<Model>,
    pub stages: CatalogService<Stage>,
    pub motions: CatalogService<Motion>,
}

impl App {
    /// Refresh models, stages and motions in that order.
    pub fn refresh_all(&self) -> Result<Vec<KindReport<ReconcileResult>>, AppError> {
        Ok(vec![
            KindReport {
                kind: Kind::Models,
                report: self.models.refresh()?,
            },
            KindReport {
                kind: Kind::Stages,
                report: self.stages.refresh()?,
            },
            KindReport {
                kind: Kind::Motions,
                report: self.motions.refresh()?,
            },
        ])
    }

    /// Generate missing embeddings for every kind.
    ///
    /// Stops at the first error; kinds already processed keep their saved
    /// embeddings.
    pub fn generate_all(&self) -> Result<Vec<KindReport<GenerateReport>>, AppError> {
        Ok(vec![
            KindReport {
                kind: Kind::Models,
                report: self.models.generate_embeddings()?,
            },
            KindReport {
                kind: Kind::Stages,
                report: self.stages.generate_embeddings()?,
            },
            KindReport {
                kind: Kind::Motions,
                report: self.motions.generate_embeddings()?,
            },
        ])
    }
}
