use serde::Serialize;
use zoomx_core::config::LoadOptions;
use zoomx_core::domain::request::Request;
use zoomx_core::errors::ApplicationError;
use zoomx_core::projection::{KindFilter, Page, StatusFilter, StatusSummary};

use super::{prepare, CommandResult};

#[derive(Clone, Copy, Debug)]
pub struct RequestsArgs {
    pub kind: KindFilter,
    pub status: StatusFilter,
    pub page: usize,
    pub json: bool,
}

#[derive(Serialize)]
struct RequestsPayload<'a> {
    page: &'a Page,
    summary: StatusSummary,
}

pub fn run(options: &LoadOptions, args: &RequestsArgs) -> CommandResult {
    let (runtime, console) = match prepare("requests", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let loaded = runtime.block_on(async {
        console.store.initial_load().await.map_err(ApplicationError::from)?;
        let snapshot = console.store.snapshot().await;

        let mut projection = console.projection();
        projection.set_kind(args.kind);
        projection.set_status(args.status);
        projection.set_page(args.page);

        let summary = StatusSummary::from_requests(&snapshot);
        Ok::<_, ApplicationError>((projection.project(&snapshot), summary))
    });

    let (page, summary) = match loaded {
        Ok(loaded) => loaded,
        Err(error) => return CommandResult::from_error("requests", error),
    };

    if args.json {
        let message = format!("page {} of {}", page.page, page.total_pages);
        return CommandResult::success_with_data(
            "requests",
            message,
            RequestsPayload { page: &page, summary },
        );
    }

    CommandResult { exit_code: 0, output: render_page(&page, args) }
}

pub(crate) fn render_page(page: &Page, args: &RequestsArgs) -> String {
    let mut lines = vec![format!(
        "requests (service: {}, status: {}) page {}/{} - {} matching",
        args.kind, args.status, page.page, page.total_pages, page.filtered_count
    )];

    if page.items.is_empty() {
        lines.push("  (no requests on this page)".to_string());
    }
    lines.extend(page.items.iter().map(render_row));
    lines.join("\n")
}

pub(crate) fn render_row(request: &Request) -> String {
    let cargo = if request.has_cargo() {
        format!(
            "  [{}x{} cm, {} kg]",
            request.width.unwrap_or_default(),
            request.length.unwrap_or_default(),
            request.weight.unwrap_or_default()
        )
    } else {
        String::new()
    };

    format!(
        "  #{:<6} {:<10} {:<9} {} -> {} ({:.1} km) R$ {} {} by {}{cargo}",
        request.code.to_string(),
        request.status.as_wire(),
        request.service.as_wire(),
        request.origin,
        request.destination,
        request.distance_km,
        request.value.round_dp(2),
        request.payment_method,
        request.requester.label(),
    )
}
