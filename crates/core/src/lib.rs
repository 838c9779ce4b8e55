pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod notification;
pub mod projection;
pub mod session;

pub use domain::request::{
    PaymentMethod, Request, RequestCode, RequestStatus, Requester, ServiceKind,
};
pub use domain::worker::{OperatorCode, Worker, WorkerCode};
pub use errors::{ApplicationError, DomainError, InterfaceError, ValidationError};
pub use export::{write_csv, ExportError};
pub use notification::{AlertDecision, AlertError, AlertPolicy, AlertSink, NotificationSignal};
pub use projection::{
    KindFilter, Page, PageResetPolicy, ProjectionState, StatusFilter, StatusSummary,
};
pub use session::{Session, SessionTeardown};
