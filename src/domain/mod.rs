//! Domain Layer
//!
//! What a configuration tree is, what the host holds, and how the two are
//! reconciled. Nothing here touches a disk, a socket or a clock.
//!
//! - `entities` - `ConfigTree`, `HostManifest`, `StateRegistry`, `DeploymentResult`
//! - `value_objects` - fingerprints, managed scope, sync operations, classifications
//! - `services` - the tree validator and the sync planner
//! - `ports` - traits the infrastructure implements (transport, runtime, audit, events)

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
