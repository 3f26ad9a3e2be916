// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scrolling page of synchronized video groups.
//!
//! Build with: `wasm-pack build --target web demos/web_groups`
//! Then serve `demos/web_groups/` and open `index.html`.
//!
//! Each `.sync-group` starts 200 ms after at least 30% of it is in view and
//! pauses when it scrolls out. Enable the `trace` feature to see scheduler
//! and sync decisions on the console.

use wasm_bindgen::prelude::*;

/// Installs tandem on the page once the document has loaded.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    tandem_backend_web::install_when_ready()
}
