//! Mini-Paginate demo (for testing purposes only)
//! The main interface is through WASM bindings.

use mini_paginate::{
    BlockKind, Document, DocumentHost, FontMetrics, HostEvent, MemoryHost, NavCommand,
    PaginateConfig, PaginateError, PageMetrics, ReconciliationController,
};
use tracing::info;

const PARAGRAPH: &str = "Pagination keeps every page within its printable height. \
    When a page grows past it, the last whole block moves to the next page; \
    when a page shrinks, blocks from the next page move back.";

fn main() -> Result<(), PaginateError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = PaginateConfig::default();
    let metrics = PageMetrics::from_config(&config)?;

    let mut document = Document::new();
    for i in 0..40 {
        if i % 8 == 0 {
            document.push_body(BlockKind::heading(1), &format!("Chapter {}", i / 8 + 1));
        }
        document.push_body(BlockKind::Paragraph, PARAGRAPH);
    }

    let host = MemoryHost::for_metrics(document, &metrics, FontMetrics::default());
    let mut controller = ReconciliationController::new(host, config)?;

    controller.handle_event(HostEvent::Ready)?;
    controller.run_until_idle()?;
    info!(pages = controller.page_count(), "initial pagination");

    // Grow the first page and let the engine push content forward
    if let Some(first) = controller.host().page_containers().first().copied() {
        for _ in 0..6 {
            controller
                .host_mut()
                .document_mut()
                .push_block(first, BlockKind::Paragraph, PARAGRAPH)?;
        }
    }
    controller.handle_event(HostEvent::ContentChanged(None))?;
    info!(pages = controller.page_count(), "after growing page 1");

    if let Some(rank) = controller.navigate(NavCommand::GoTo(2)) {
        info!(rank, "navigated");
    }

    for page in controller.paginator().map(|p| p.pages()).unwrap_or_default() {
        println!(
            "page {:>3}: {:>4} blocks, {:>7.1} / {:.1} mm",
            page.rank,
            controller.host().document().container(page.container).map_or(0, |c| c.blocks.len()),
            controller.px_to_mm(page.content_height),
            controller.px_to_mm(page.max_height),
        );
    }

    controller.handle_event(HostEvent::Removed)?;
    Ok(())
}
