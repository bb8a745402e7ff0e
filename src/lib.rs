// Status query API
pub mod api;

// Bus client and subject mapping
pub mod bus;

// Room catalog lookup
pub mod catalog;

// Engine configuration
pub mod config;

// Wire payload types and validation
pub mod event;

// Sensor/actuator ingest loop
pub mod ingest;

// Alerting and operator commands
pub mod notify;

// Bounded outbound delivery queue
pub mod outbound;

// Actuator decision rules
pub mod rules;

// Class schedule evaluation
pub mod schedule;

// Best-effort state file mirror
pub mod snapshot;

// Per-room state store
pub mod state;

// External telemetry forwarding
pub mod telemetry;
