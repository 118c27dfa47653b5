pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod interaction;
pub mod session;
pub mod shortcuts;
pub mod snapping;
pub mod state;
pub mod strategies;

pub use commands::{
    CanvasCommand, FoldReport, InteractionLifecycle, WhenToRun, fold_and_apply_commands,
};
pub use config::{ConfigError, EngineConfig, PressDuringSession, SliderSnapping};
pub use dispatch::{CommitSummary, EditorAction, EditorStore, StrategyState};
pub use error::CommandError;
pub use input::{InputEvent, Key, Modifiers};
pub use interaction::{InteractionTool, PointerTarget};
pub use session::{ActiveControl, InteractionSession, SessionPhase};
pub use state::{CursorStyle, EditorState, EditorStatePatch, ElementsToRerender};
pub use strategies::{
    CanvasStrategy, CustomStrategyState, InteractionCanvasState, StrategyApplicationResult,
    StrategyId, StrategyStatus,
};
