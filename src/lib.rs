// Klaxon: toxicity alerts for Slack workspaces
//
// This is the library root. Each module corresponds to a stage of the
// moderation pipeline: inbound Slack events in, classifier verdicts
// aggregated, alerts posted back into the offending thread.

pub mod classifiers;
pub mod config;
pub mod pipeline;
pub mod slack;
pub mod verdict;
