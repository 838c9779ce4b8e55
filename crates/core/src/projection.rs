//! Pure filter and pagination derivation over a request snapshot.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::request::{Request, RequestStatus, ServiceKind};
use crate::errors::DomainError;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Only(ServiceKind),
}

impl KindFilter {
    pub fn matches(self, request: &Request) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => request.service == kind,
        }
    }
}

impl FromStr for KindFilter {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" | "todos" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(kind) => write!(f, "{kind}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(RequestStatus),
}

impl StatusFilter {
    pub fn matches(self, request: &Request) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => request.status == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" | "todos" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

/// What happens to the page index when a filter changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageResetPolicy {
    #[default]
    ResetOnFilterChange,
    Preserve,
}

pub fn filter_requests(
    requests: &[Request],
    kind: KindFilter,
    status: StatusFilter,
) -> Vec<&Request> {
    requests.iter().filter(|request| kind.matches(request) && status.matches(request)).collect()
}

pub fn total_pages(filtered_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    filtered_count.div_ceil(page_size)
}

/// Slices one 1-based page. Pages past the end yield an empty slice.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub items: Vec<Request>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectionState {
    kind: KindFilter,
    status: StatusFilter,
    page: usize,
    page_size: usize,
    reset_policy: PageResetPolicy,
}

impl Default for ProjectionState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, PageResetPolicy::default())
    }
}

impl ProjectionState {
    pub fn new(page_size: usize, reset_policy: PageResetPolicy) -> Self {
        Self {
            kind: KindFilter::All,
            status: StatusFilter::All,
            page: 1,
            page_size: page_size.max(1),
            reset_policy,
        }
    }

    pub fn kind(&self) -> KindFilter {
        self.kind
    }

    pub fn status(&self) -> StatusFilter {
        self.status
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_kind(&mut self, kind: KindFilter) {
        if self.kind != kind {
            self.kind = kind;
            self.on_filter_changed();
        }
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        if self.status != status {
            self.status = status;
            self.on_filter_changed();
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    fn on_filter_changed(&mut self) {
        if self.reset_policy == PageResetPolicy::ResetOnFilterChange {
            self.page = 1;
        }
    }

    pub fn filtered<'a>(&self, requests: &'a [Request]) -> Vec<&'a Request> {
        filter_requests(requests, self.kind, self.status)
    }

    pub fn project(&self, requests: &[Request]) -> Page {
        let filtered = self.filtered(requests);
        Page {
            page: self.page,
            page_size: self.page_size,
            total_pages: total_pages(filtered.len(), self.page_size),
            filtered_count: filtered.len(),
            items: page_slice(&filtered, self.page, self.page_size)
                .iter()
                .map(|request| (*request).clone())
                .collect(),
        }
    }
}

/// Per-status counts shown on the dashboard cards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub pendente: usize,
    pub aceita: usize,
    pub recusada: usize,
    pub concluida: usize,
}

impl StatusSummary {
    pub fn from_requests(requests: &[Request]) -> Self {
        requests.iter().fold(Self::default(), |mut summary, request| {
            summary.total += 1;
            match request.status {
                RequestStatus::Pendente => summary.pendente += 1,
                RequestStatus::Aceita => summary.aceita += 1,
                RequestStatus::Recusada => summary.recusada += 1,
                RequestStatus::Concluida => summary.concluida += 1,
            }
            summary
        })
    }
}
