//! Outbound messages from the canvas to the extension.
//!
//! Messages are pushed straight into a JS callback when one is attached
//! (normally a thin wrapper around `vscode.postMessage`), otherwise they
//! queue up until the webview drains them with `take_messages`.

use deco_core::model::{CharacterEntity, ShapeEntity};
use deco_editor::{Notice, SceneSink};
use serde::Serialize;

/// Wire shape of everything the canvas sends. Save messages match the
/// host's `saveCoordinates` / `saveShapes` requests field for field.
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Outbound<'a> {
    SaveCoordinates {
        data: &'a [CharacterEntity],
        auto_save: bool,
    },
    SaveShapes {
        data: &'a [ShapeEntity],
        auto_save: bool,
    },
    MarkUsed {
        path: &'a str,
    },
    MarkAvailable {
        path: &'a str,
    },
    Flash {
        id: u32,
    },
}

#[derive(Default)]
pub struct WebviewSink {
    poster: Option<js_sys::Function>,
    queue: Vec<String>,
}

impl WebviewSink {
    pub fn set_poster(&mut self, poster: Option<js_sys::Function>) {
        self.poster = poster;
    }

    /// Serialized messages waiting to be posted, oldest first.
    pub fn pending(&self) -> &[String] {
        &self.queue
    }

    /// Drain the queue as a JSON array.
    pub fn take_json(&mut self) -> String {
        let body = self.queue.join(",");
        self.queue.clear();
        format!("[{body}]")
    }

    fn post(&mut self, message: Outbound<'_>) {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                log::error!("dropping outbound message: {e}");
                return;
            }
        };
        match &self.poster {
            Some(poster) => {
                let arg = wasm_bindgen::JsValue::from_str(&json);
                if let Err(e) = poster.call1(&wasm_bindgen::JsValue::NULL, &arg) {
                    log::warn!("postMessage callback threw: {e:?}");
                }
            }
            None => self.queue.push(json),
        }
    }
}

impl SceneSink for WebviewSink {
    fn save_characters(&mut self, characters: &[CharacterEntity], notify: bool) {
        self.post(Outbound::SaveCoordinates {
            data: characters,
            auto_save: !notify,
        });
    }

    fn save_shapes(&mut self, shapes: &[ShapeEntity], notify: bool) {
        self.post(Outbound::SaveShapes {
            data: shapes,
            auto_save: !notify,
        });
    }

    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::MarkUsed(path) => self.post(Outbound::MarkUsed { path: &path }),
            Notice::MarkAvailable(path) => self.post(Outbound::MarkAvailable { path: &path }),
            Notice::Flash(id) => self.post(Outbound::Flash { id }),
        }
    }
}
