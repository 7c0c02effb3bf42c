//! Mokeke Tracker Web (WASM)
//!
//! ブラウザ向けのバインディング。localStorage への保存と fetch による読み込みを担う。

mod dto;
mod fetch;
mod session;
mod storage;

pub use session::TrackerSession;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}
