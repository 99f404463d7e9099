//! # chat-widget
//!
//! Interaction core of a floating AI assistant widget: a draggable trigger
//! whose position survives reloads, a session-scoped conversation, and a
//! single-flight request/response cycle against a chat endpoint with a
//! deterministic fallback on failure. Rendering lives outside this crate;
//! it observes [`view::WidgetView`] snapshots.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`storage`] | Key-value persistence capability and backends |
//! | [`position`] | Trigger position, clamping, `PositionStore` |
//! | [`drag`] | Pointer gesture state machine |
//! | [`conversation`] | Session id, messages, `ConversationLog` |
//! | [`api`] | Chat endpoint wire types and HTTP transport |
//! | [`dispatcher`] | Single in-flight request lifecycle |
//! | [`events`] | Host events and the `EventSource` capability |
//! | [`theme`] | Theme token |
//! | [`widget`] | Pure state machine and effects |
//! | [`view`] | Render snapshot |
//! | [`controller`] | Runtime that executes effects and runs the event loop |
//! | [`config`] | Environment configuration |

pub mod api;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod dispatcher;
pub mod drag;
pub mod events;
pub mod position;
pub mod storage;
pub mod theme;
pub mod view;
pub mod widget;
