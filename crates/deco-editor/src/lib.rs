pub mod autosave;
pub mod controller;
pub mod input;
pub mod registry;
pub mod scene;
pub mod shortcuts;
pub mod tools;

pub use autosave::{Notice, RecordingSink, SceneAutosaveBridge, SceneDefaults, SceneSink};
pub use controller::{CursorHint, InteractionController, InteractionMode, InteractionState};
pub use input::InputEvent;
pub use registry::UsedFileRegistry;
pub use scene::CanvasSceneModel;
