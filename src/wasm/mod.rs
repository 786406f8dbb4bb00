//! WASM bindings for the pagination engine

use crate::config::PaginateConfig;
use crate::controller::{EngineState, ReconciliationController};
use crate::document::{BlockId, ContentModel, Document};
use crate::error::PaginateError;
use crate::host::{ContentChange, DocumentHost, HostEvent, MemoryHost};
use crate::layout::FontMetrics;
use crate::metrics::PageMetrics;
use crate::navigation::{parse_rank_input, NavCommand};
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: PaginateError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// WASM-exposed paginated session over an in-memory document
#[wasm_bindgen]
pub struct WasmPaginator {
    controller: ReconciliationController<MemoryHost>,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Create a session from a JSON config (may be empty) and JSON content
    /// (may be empty for a blank document)
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, content_json: &str) -> Result<WasmPaginator, JsValue> {
        let config = if config_json.trim().is_empty() {
            PaginateConfig::default()
        } else {
            PaginateConfig::from_json(config_json).map_err(to_js)?
        };
        let document = if content_json.trim().is_empty() {
            Document::placeholder()
        } else {
            let model = ContentModel::parse(content_json).map_err(|e| to_js(e.into()))?;
            Document::from_model(model)
        };
        let metrics = PageMetrics::from_config(&config).map_err(to_js)?;
        let host = MemoryHost::for_metrics(document, &metrics, FontMetrics::default());
        let controller = ReconciliationController::new(host, config).map_err(to_js)?;
        Ok(Self { controller })
    }

    /// The editing surface is ready
    pub fn ready(&mut self) -> Result<(), JsValue> {
        self.controller.handle_event(HostEvent::Ready).map_err(to_js)
    }

    /// The editor is gone; the session is finished
    pub fn removed(&mut self) -> Result<(), JsValue> {
        self.controller.handle_event(HostEvent::Removed).map_err(to_js)
    }

    /// Apply an edit producing `content`, then notify the engine
    #[wasm_bindgen(js_name = editContent)]
    pub fn edit_content(&mut self, content: &str) -> Result<(), JsValue> {
        let previous = self.controller.host().content();
        self.controller
            .host_mut()
            .set_content(content)
            .map_err(|e| to_js(e.into()))?;
        let change = ContentChange {
            new_content: self.controller.host().content(),
            previous_content: previous,
        };
        self.controller
            .handle_event(HostEvent::ContentChanged(Some(change)))
            .map_err(to_js)
    }

    /// Replace the whole content
    #[wasm_bindgen(js_name = replaceContent)]
    pub fn replace_content(&mut self, content: &str) -> Result<(), JsValue> {
        self.controller
            .host_mut()
            .set_content(content)
            .map_err(|e| to_js(e.into()))?;
        self.controller
            .handle_event(HostEvent::FullContentReplaced {
                content: Some(content.to_string()),
            })
            .map_err(to_js)
    }

    /// Place the caret in a block
    #[wasm_bindgen(js_name = selectBlock)]
    pub fn select_block(&mut self, block_id: u64) -> Result<(), JsValue> {
        let host = self.controller.host_mut();
        host.select_block(BlockId(block_id));
        let page_container = host.selection_container();
        self.controller
            .handle_event(HostEvent::SelectionContextChanged { page_container })
            .map_err(to_js)
    }

    /// Advance the engine clock, running deferred work
    pub fn advance(&mut self, ms: u32) -> Result<(), JsValue> {
        self.controller
            .advance(Duration::from_millis(u64::from(ms)))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = runUntilIdle)]
    pub fn run_until_idle(&mut self) -> Result<(), JsValue> {
        self.controller.run_until_idle().map_err(to_js)
    }

    #[wasm_bindgen(js_name = enableWatch)]
    pub fn enable_watch(&mut self) {
        self.controller.enable_watch();
    }

    #[wasm_bindgen(js_name = disableWatch)]
    pub fn disable_watch(&mut self) {
        self.controller.disable_watch();
    }

    /// Rank of the focused page
    #[wasm_bindgen(js_name = currentPage)]
    pub fn current_page(&self) -> Option<u32> {
        self.controller.current_page().map(|page| page.rank)
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.controller.page_count()
    }

    pub fn px2mm(&self, px: f32) -> f32 {
        self.controller.px_to_mm(px)
    }

    #[wasm_bindgen(js_name = isListening)]
    pub fn is_listening(&self) -> bool {
        self.controller.is_listening()
    }

    pub fn state(&self) -> String {
        match self.controller.state() {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initializing => "initializing",
            EngineState::Listening => "listening",
            EngineState::Destroyed => "destroyed",
        }
        .to_string()
    }

    /// "previous", "next" or a page rank typed in the rank input
    pub fn navigate(&mut self, command: &str) -> Option<u32> {
        let command = match command.trim() {
            "previous" | "prev" => NavCommand::Previous,
            "next" => NavCommand::Next,
            input => parse_rank_input(input, self.controller.page_count())?,
        };
        self.controller.navigate(command)
    }

    /// Full content as JSON
    #[wasm_bindgen(js_name = getContent)]
    pub fn get_content(&self) -> String {
        self.controller.host().content()
    }
}
